//! Fatal level-construction errors.
//!
//! Anything in here aborts building a level; the caller never receives a
//! half-built [`crate::Level`]. Recoverable conditions (unknown layer kinds,
//! factories returning nothing) are logged instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Failed to read '{path}': {details}")]
    Read { path: String, details: String },

    #[error("Failed to parse '{path}': {details}")]
    Parse { path: String, details: String },

    #[error("Malformed map dimensions: {0}")]
    MalformedDimensions(String),

    #[error("No '{0}' layer in tile map")]
    MissingMainLayer(String),

    #[error("No 'player' sprite in tile map")]
    MissingPlayer,

    #[error("Unable to create object '{name}': unknown type '{kind}'")]
    UnknownObjectType { name: String, kind: String },

    #[error("Failed to construct object '{name}' of type '{kind}': {details}")]
    ObjectConstruction {
        name: String,
        kind: String,
        details: String,
    },

    #[error("No level registered with index {0}")]
    UnknownLevel(u32),

    #[error("Asset '{0}' was not loaded")]
    MissingAsset(String),
}
