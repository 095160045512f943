//! OpenAPI generation for YARPC services
//!
//! This crate transforms a parsed `RpcDocument` into an OpenAPI 3.1 document:
//! - every query and mutation becomes an operation on its own path
//! - input schemas are split into parameters and a JSON request body
//! - output and errors become the operation's responses
//! - hand-written `paths` are kept, with generated operations merged in
//!
//! ## Usage
//! ```rust,ignore
//! use yarpc_generator::{emit, transform, OutputFormat};
//!
//! let doc = yarpc_parser::load_document("widgets.yarpc.yaml")?;
//! let openapi = transform(&doc)?;
//! println!("{}", emit(&openapi, OutputFormat::Yaml)?);
//! ```

mod document;
mod emit;
mod operation;
mod parameters;
mod resolver;

pub use document::{DocumentTransformer, TransformerOptions};
pub use emit::{emit, to_json, to_yaml, write_to_file, OutputFormat};
pub use operation::{build_responses, OperationTransformer, DEFAULT_DESCRIPTION, DEFAULT_STATUS_CODE};
pub use parameters::{split_input, SplitInput};
pub use resolver::{ComponentsResolver, RefResolver};

use yarpc_common::{OpenApiDocument, Result, RpcDocument};

/// Transform a YARPC document with default options (convenience function)
pub fn transform(doc: &RpcDocument) -> Result<OpenApiDocument> {
    DocumentTransformer::transform(doc, TransformerOptions::default())
}
