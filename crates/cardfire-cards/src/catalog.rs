//! The card asset catalog.
//!
//! Every card image is read and base64-encoded exactly once, before any
//! room exists. Rooms share the catalog through an `Arc` and only ever
//! read from it, so dealing and drawing never wait on the filesystem.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{CardId, CatalogError};

/// Read-only map from card identifier to its transmissible payload.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    /// Identifiers in a stable order (sorted by file name when loaded
    /// from disk).
    ids: Vec<CardId>,
    /// Base64 of each card's file contents.
    payloads: HashMap<CardId, String>,
}

impl AssetCatalog {
    /// Loads every regular, non-hidden file in `dir` as a card. The file
    /// name is the card identifier.
    ///
    /// # Errors
    /// - [`CatalogError::Io`] if the directory or a file can't be read
    /// - [`CatalogError::Empty`] if no card files were found
    pub async fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let io_err = |source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            if !entry.file_type().await.map_err(io_err)?.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) if !name.starts_with('.') => name,
                Ok(_) => continue,
                Err(raw) => {
                    tracing::warn!(name = ?raw, "skipping card with non-UTF-8 file name");
                    continue;
                }
            };
            files.push((name, entry.path()));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut loaded = Vec::with_capacity(files.len());
        for (name, path) in files {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| CatalogError::Io { path, source })?;
            loaded.push((name, bytes));
        }

        if loaded.is_empty() {
            return Err(CatalogError::Empty(dir.to_path_buf()));
        }
        let catalog = Self::from_payloads(loaded)?;
        tracing::info!(dir = %dir.display(), cards = catalog.len(), "card catalog loaded");
        Ok(catalog)
    }

    /// Builds a catalog from in-memory `(identifier, raw bytes)` pairs,
    /// keeping their order.
    ///
    /// # Errors
    /// [`CatalogError::Duplicate`] if an identifier appears twice.
    pub fn from_payloads<I, S, B>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, B)>,
        S: Into<String>,
        B: AsRef<[u8]>,
    {
        let mut ids = Vec::new();
        let mut payloads = HashMap::new();
        for (name, bytes) in entries {
            let id = CardId::new(name);
            if payloads.contains_key(&id) {
                return Err(CatalogError::Duplicate(id));
            }
            payloads.insert(id.clone(), STANDARD.encode(bytes));
            ids.push(id);
        }
        Ok(Self { ids, payloads })
    }

    /// Number of distinct cards.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All identifiers, in catalog order.
    pub fn ids(&self) -> &[CardId] {
        &self.ids
    }

    /// The base64 payload of `id`, if it is in the catalog.
    pub fn payload(&self, id: &CardId) -> Option<&str> {
        self.payloads.get(id).map(String::as_str)
    }
}
