//! Serialization of generated documents

use std::fmt;
use std::fs;
use std::path::Path;
use yarpc_common::{OpenApiDocument, Result, YarpcError};

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Format implied by a file extension, if it names one
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Pretty-printed JSON with a trailing newline
pub fn to_json(doc: &OpenApiDocument) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(doc)?;
    rendered.push('\n');
    Ok(rendered)
}

/// YAML with a trailing newline
pub fn to_yaml(doc: &OpenApiDocument) -> Result<String> {
    let mut rendered = serde_yaml::to_string(doc)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

pub fn emit(doc: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(doc),
        OutputFormat::Yaml => to_yaml(doc),
    }
}

/// Render `doc` and write it to `path`, creating parent directories
pub fn write_to_file(doc: &OpenApiDocument, format: OutputFormat, path: &Path) -> Result<()> {
    let rendered = emit(doc, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            YarpcError::Emit(format!(
                "Failed to create output directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    fs::write(path, rendered)
        .map_err(|e| YarpcError::Emit(format!("Failed to write {}: {}", path.display(), e)))
}
