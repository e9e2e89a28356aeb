use std::path::PathBuf;

/// Failures that keep the structural check from running at all.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Unsupported panel code: {panel}")]
    UnsupportedPanel { panel: String },

    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema {name}: {message}")]
    Compile { name: String, message: String },
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            name: name.into(),
            source,
        }
    }
}
