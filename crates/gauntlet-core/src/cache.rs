//! Content-addressed store of inferred signatures.
//!
//! Keyed by the hex sha-256 of the callable's verbatim source text, so any
//! edit to the callable misses and re-infers while untouched siblings skip
//! the extract + infer passes entirely. Serializable so an outer layer can
//! persist it between runs; this crate never touches the filesystem.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use gauntlet_profile::FunctionSignature;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DomainCache {
    entries: HashMap<String, FunctionSignature>,
}

impl DomainCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache key for a callable's source text.
    pub fn key(source_text: &str) -> String {
        hex::encode(Sha256::digest(source_text.as_bytes()))
    }

    pub fn get(&self, key: &str) -> Option<&FunctionSignature> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, signature: FunctionSignature) {
        self.entries.insert(key, signature);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
