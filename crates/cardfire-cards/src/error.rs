//! Error types for the card layer.

use std::path::PathBuf;

use crate::CardId;

/// Errors from hand and pile operations.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// The hand already holds its maximum number of cards.
    #[error("hand is full, cannot take {0}")]
    HandFull(CardId),
}

/// Errors while building the asset catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Reading the catalog directory or one of its files failed.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory holds no card files.
    #[error("no cards found in {}", .0.display())]
    Empty(PathBuf),

    /// Two entries share an identifier.
    #[error("duplicate card {0}")]
    Duplicate(CardId),
}
