//! Integration tests for loading YARPC documents from disk

use std::fs;
use yarpc_common::{HttpMethod, InputLocation, YarpcError};
use yarpc_parser::{load_document, RpcParser, SourceFormat};

const WIDGETS_YAML: &str = r##"
yarpc: 1.0.0
info:
  title: Widgets API
  version: 1.0.0
operations:
  queries:
    getWidget:
      path: /widgets/{widgetId}
      input:
        schema:
          type: object
          properties:
            widgetId: { type: string }
          required: [widgetId]
        parameters:
          widgetId: { in: path }
  mutations:
    deleteWidget:
      method: delete
      errors:
        404: { description: Not found }
"##;

const WIDGETS_JSON: &str = r##"{
  "yarpc": "1.0.0",
  "info": { "title": "Widgets API", "version": "1.0.0" },
  "operations": {
    "mutations": {
      "createWidget": {
        "input": { "schema": { "$ref": "#/components/schemas/CreateWidgetInput" } },
        "errors": { "400": { "$ref": "#/components/responses/BadRequest" } }
      }
    }
  }
}"##;

#[test]
fn test_load_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widgets.yarpc.yaml");
    fs::write(&path, WIDGETS_YAML).unwrap();

    let parser = RpcParser::from_file(&path).unwrap();
    assert_eq!(parser.source_format(), SourceFormat::Yaml);

    let doc = parser.document();
    let query = &doc.operations.queries["getWidget"];
    assert_eq!(query.path.as_deref(), Some("/widgets/{widgetId}"));
    assert_eq!(
        query.input.as_ref().unwrap().parameters["widgetId"].location,
        Some(InputLocation::Path)
    );

    let mutation = &doc.operations.mutations["deleteWidget"];
    assert_eq!(mutation.method, Some(HttpMethod::Delete));
    assert_eq!(mutation.errors.as_ref().unwrap().len(), 1);
}

#[test]
fn test_load_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widgets.yarpc.json");
    fs::write(&path, WIDGETS_JSON).unwrap();

    let parser = RpcParser::from_file(&path).unwrap();
    assert_eq!(parser.source_format(), SourceFormat::Json);

    let doc = parser.into_document();
    assert!(doc.operations.queries.is_empty());
    assert!(doc.operations.mutations.contains_key("createWidget"));
}

#[test]
fn test_json_content_in_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widgets.yarpc");
    fs::write(&path, WIDGETS_JSON).unwrap();

    let doc = load_document(&path).unwrap();
    assert_eq!(doc.version(), Some("1.0.0"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");

    let err = load_document(&path).err().unwrap();
    assert!(matches!(err, YarpcError::Parse(_)));
    assert!(err.to_string().contains("Failed to read YARPC file"));
}

#[test]
fn test_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"yarpc\": ").unwrap();

    let err = load_document(&path).err().unwrap();
    assert!(err.to_string().contains("Failed to parse YARPC JSON"));
}
