//! File bytes provider
//!
//! The core never touches the filesystem directly: content hashing and link
//! resolution go through this narrow interface so that callers can back it
//! with disk, network storage, or fixtures.

use std::collections::HashMap;

use crate::error::{AquaError, AquaResult};

/// External collaborator resolving names to raw bytes
pub trait FileReader: Send + Sync {
    /// Read the bytes behind an external name
    fn read(&self, name: &str) -> AquaResult<Vec<u8>>;
}

/// In-memory file provider
#[derive(Debug, Clone, Default)]
pub struct MemoryFileReader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFileReader {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), bytes.into());
    }

    /// Builder-style registration
    pub fn with_file(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }
}

impl FileReader for MemoryFileReader {
    fn read(&self, name: &str) -> AquaResult<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| AquaError::FileNotFound(name.to_string()))
    }
}
