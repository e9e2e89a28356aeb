//! Schema documents and their selection by panel code.
//!
//! The v0.1 documents ship embedded in the crate. A schema directory replaces
//! them wholesale. Every document next to the selected schema is registered
//! under its `$id`, so relative `$ref`s such as `common.json#/$defs/panel`
//! resolve without network access.

use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::{Resource, Validator};
use serde_json::Value;
use tracing::debug;

use crate::error::SchemaError;

pub const SCHEMA_VERSION: &str = "v0.1";

const EMBEDDED_SCHEMAS: &[(&str, &str)] = &[
    ("common.json", include_str!("../schema/v0.1/common.json")),
    ("cbc.json", include_str!("../schema/v0.1/cbc.json")),
    ("biochem.json", include_str!("../schema/v0.1/biochem.json")),
    ("urinalysis.json", include_str!("../schema/v0.1/urinalysis.json")),
];

const SCHEMA_BY_PANEL: &[(&str, &str)] = &[
    ("CBC", "cbc.json"),
    ("BIOCHEM", "biochem.json"),
    ("URINALYSIS", "urinalysis.json"),
];

/// Which schema a payload is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaReference {
    /// Panel code, resolved through the store.
    Panel(String),
    /// Explicit schema file; overrides panel-based resolution.
    Path(PathBuf),
}

impl SchemaReference {
    pub fn panel(code: impl Into<String>) -> Self {
        Self::Panel(code.into())
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

#[derive(Debug, Clone)]
struct SchemaDocument {
    name: String,
    contents: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum SchemaSource {
    #[default]
    Embedded,
    Directory(PathBuf),
}

/// Where panel schemas are loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaStore {
    source: SchemaSource,
}

impl SchemaStore {
    pub fn embedded() -> Self {
        Self::default()
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: SchemaSource::Directory(dir.into()),
        }
    }

    pub fn schema_dir(&self) -> Option<&Path> {
        match &self.source {
            SchemaSource::Embedded => None,
            SchemaSource::Directory(dir) => Some(dir),
        }
    }

    /// Compiles the schema selected by `reference`.
    pub fn compile(&self, reference: &SchemaReference) -> Result<Validator, SchemaError> {
        let (root, registry) = match reference {
            SchemaReference::Panel(code) => {
                let file_name = schema_file_for_panel(code)?;
                let documents = self.documents()?;
                let root = documents
                    .iter()
                    .find(|document| document.name == file_name)
                    .cloned()
                    .ok_or_else(|| self.missing(file_name))?;
                (root, documents)
            }
            SchemaReference::Path(path) => {
                let root = read_document(path)?;
                let registry = documents_in(sibling_dir(path))?;
                (root, registry)
            }
        };
        debug!(schema = %root.name, registered = registry.len(), "compiling schema");
        build(&root, &registry)
    }

    fn documents(&self) -> Result<Vec<SchemaDocument>, SchemaError> {
        match &self.source {
            SchemaSource::Embedded => EMBEDDED_SCHEMAS
                .iter()
                .map(|(name, text)| {
                    serde_json::from_str(text)
                        .map(|contents| SchemaDocument {
                            name: (*name).to_string(),
                            contents,
                        })
                        .map_err(|source| SchemaError::json(*name, source))
                })
                .collect(),
            SchemaSource::Directory(dir) => documents_in(dir),
        }
    }

    fn missing(&self, file_name: &str) -> SchemaError {
        let path = match &self.source {
            SchemaSource::Embedded => PathBuf::from(file_name),
            SchemaSource::Directory(dir) => dir.join(file_name),
        };
        SchemaError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "schema file not found"),
        )
    }
}

/// Schema file name for a panel code (case-insensitive).
pub fn schema_file_for_panel(panel_code: &str) -> Result<&'static str, SchemaError> {
    let normalized = panel_code.trim().to_uppercase();
    SCHEMA_BY_PANEL
        .iter()
        .find(|(code, _)| *code == normalized)
        .map(|(_, file_name)| *file_name)
        .ok_or_else(|| SchemaError::UnsupportedPanel {
            panel: panel_code.to_string(),
        })
}

fn sibling_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn read_document(path: &Path) -> Result<SchemaDocument, SchemaError> {
    let text = fs::read_to_string(path).map_err(|source| SchemaError::io(path, source))?;
    let name = path.display().to_string();
    let contents = serde_json::from_str(&text).map_err(|source| SchemaError::json(&name, source))?;
    Ok(SchemaDocument { name, contents })
}

/// Every `*.json` file in `dir`, sorted by file name.
fn documents_in(dir: &Path) -> Result<Vec<SchemaDocument>, SchemaError> {
    let entries = fs::read_dir(dir).map_err(|source| SchemaError::io(dir, source))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| SchemaError::io(dir, source))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| -> Result<SchemaDocument, SchemaError> {
            let mut document = read_document(path)?;
            if let Some(file_name) = path.file_name() {
                document.name = file_name.to_string_lossy().into_owned();
            }
            Ok(document)
        })
        .collect()
}

fn schema_id(contents: &Value) -> Option<&str> {
    contents
        .get("$id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

fn build(root: &SchemaDocument, registry: &[SchemaDocument]) -> Result<Validator, SchemaError> {
    let root_id = schema_id(&root.contents);
    let mut options = jsonschema::draft202012::options();
    for document in registry {
        let Some(id) = schema_id(&document.contents) else {
            continue;
        };
        if Some(id) == root_id {
            continue;
        }
        options = options.with_resource(id, Resource::from_contents(document.contents.clone()));
    }
    options
        .build(&root.contents)
        .map_err(|error| SchemaError::Compile {
            name: root.name.clone(),
            message: error.to_string(),
        })
}
