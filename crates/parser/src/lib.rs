//! YARPC document sources
//!
//! This crate produces `RpcDocument`s for the transformer, either by parsing
//! a service description file or by building one in code.
//!
//! ## File formats
//! - `*.json` is parsed as JSON
//! - anything else is parsed as YAML (which also accepts JSON)
//!
//! ## Usage
//! ```rust,ignore
//! use yarpc_parser::RpcParser;
//!
//! let doc = RpcParser::from_file("widgets.yarpc.yaml")?.into_document();
//! ```

mod builder;
mod loader;

pub use builder::ServiceBuilder;
pub use loader::{detect_format, RpcParser, SourceFormat};

use std::path::Path;
use yarpc_common::{Result, RpcDocument};

/// Load a YARPC document from a file
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<RpcDocument> {
    RpcParser::from_file(path).map(RpcParser::into_document)
}
