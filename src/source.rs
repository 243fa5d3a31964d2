//! Where blank templates come from.
//!
//! The assembler asks a [`TemplateSource`] for a resource by file name and
//! treats any failure as fatal for the run.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ClaimError;

pub trait TemplateSource {
    /// Fetch the raw bytes of `resource`.
    fn fetch(&self, resource: &str) -> Result<Vec<u8>, ClaimError>;
}

/// Resolves resources as files inside a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateSource for DirectorySource {
    fn fetch(&self, resource: &str) -> Result<Vec<u8>, ClaimError> {
        let path = self.root.join(resource);
        debug!(path = %path.display(), "reading template");
        std::fs::read(&path).map_err(|e| ClaimError::TemplateLoad {
            resource: resource.to_string(),
            reason: format!("{} ({})", e, path.display()),
        })
    }
}

/// Templates held in memory, e.g. bundled with `include_bytes!` or built
/// in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(resource, bytes);
        self
    }

    pub fn insert(&mut self, resource: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(resource.into(), bytes);
    }
}

impl TemplateSource for MemorySource {
    fn fetch(&self, resource: &str) -> Result<Vec<u8>, ClaimError> {
        self.files
            .get(resource)
            .cloned()
            .ok_or_else(|| ClaimError::TemplateLoad {
                resource: resource.to_string(),
                reason: "not found".to_string(),
            })
    }
}

impl<S: TemplateSource + ?Sized> TemplateSource for &S {
    fn fetch(&self, resource: &str) -> Result<Vec<u8>, ClaimError> {
        (**self).fetch(resource)
    }
}
