//! YARPC document file loader

use std::fs;
use std::path::Path;
use yarpc_common::{RpcDocument, YarpcError, Result};

/// Serialization a YARPC document was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

/// YARPC document parser
///
/// Reads service descriptions written in YAML or JSON.
pub struct RpcParser {
    /// Loaded document
    document: RpcDocument,

    /// Format the document was parsed from
    format: SourceFormat,
}

impl RpcParser {
    /// Load a YARPC document from file path
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = RpcParser::from_file("widgets.yarpc.yaml")?;
    /// let doc = parser.into_document();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            YarpcError::Parse(format!(
                "Failed to read YARPC file {}: {}",
                path.display(),
                e
            ))
        })?;

        match detect_format(path) {
            SourceFormat::Json => Self::from_json(&content),
            SourceFormat::Yaml => Self::from_yaml(&content),
        }
    }

    /// Parse a YARPC document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let document = serde_json::from_str(json)
            .map_err(|e| YarpcError::Parse(format!("Failed to parse YARPC JSON: {}", e)))?;

        Ok(Self {
            document,
            format: SourceFormat::Json,
        })
    }

    /// Parse a YARPC document from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document = serde_yaml::from_str(yaml)
            .map_err(|e| YarpcError::Parse(format!("Failed to parse YARPC YAML: {}", e)))?;

        Ok(Self {
            document,
            format: SourceFormat::Yaml,
        })
    }

    /// Get reference to the parsed document
    pub fn document(&self) -> &RpcDocument {
        &self.document
    }

    pub fn into_document(self) -> RpcDocument {
        self.document
    }

    pub fn source_format(&self) -> SourceFormat {
        self.format
    }
}

/// Detect the source format from the file extension
pub fn detect_format(path: &Path) -> SourceFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
        _ => SourceFormat::Yaml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = "yarpc: 1.0.0\ninfo:\n  title: Test API\n  version: 1.0.0\n";

        let parser = RpcParser::from_yaml(yaml).unwrap();
        assert_eq!(parser.source_format(), SourceFormat::Yaml);
        assert_eq!(parser.document().version(), Some("1.0.0"));
        assert_eq!(parser.document().info.title, "Test API");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = RpcParser::from_json("{ \"info\": ").err().unwrap();
        assert!(err.to_string().starts_with("Parse error: Failed to parse YARPC JSON"));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("api.json")), SourceFormat::Json);
        assert_eq!(detect_format(Path::new("api.JSON")), SourceFormat::Json);
        assert_eq!(detect_format(Path::new("api.yaml")), SourceFormat::Yaml);
        assert_eq!(detect_format(Path::new("api.yml")), SourceFormat::Yaml);
        assert_eq!(detect_format(Path::new("api")), SourceFormat::Yaml);
    }
}
