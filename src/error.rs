//! Error kinds for the provisioning steps.
//! Every variant is terminal; `main` reports it and exits.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("no usable hardware address on `{primary}` or `{fallback}`")]
    InterfaceNotFound { primary: String, fallback: String },

    #[error("hardware address `{address}` of `{interface}` is not 12 hex digits")]
    MalformedAddress { interface: String, address: String },

    #[error("unknown region `{0}` (expected one of {known})", known = crate::bands::known_regions())]
    UnknownRegion(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize gateway configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("hostname prompt failed: {0}")]
    Prompt(String),
}

impl ProvisionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
