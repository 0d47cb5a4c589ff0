//! Sequence detection requests.

use std::sync::Arc;

use seqconv_core::error::CoreError;
use seqconv_core::sequence::{first_sequence, SequenceDescriptor};

use crate::api::{ApiError, ConverterBackend};

/// Scan failures. "No sequence found" is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("no directory given to scan")]
    MissingPath,

    #[error("scan request failed: {0}")]
    Request(#[from] ApiError),

    #[error("scan returned an invalid sequence: {0}")]
    InvalidDescriptor(#[from] CoreError),
}

#[derive(Clone)]
pub struct SequenceScanner {
    backend: Arc<dyn ConverterBackend>,
}

impl SequenceScanner {
    pub fn new(backend: Arc<dyn ConverterBackend>) -> Self {
        Self { backend }
    }

    /// Scan `path` and return the first detected sequence, if any.
    pub async fn scan(&self, path: &str) -> Result<Option<SequenceDescriptor>, ScanError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(ScanError::MissingPath);
        }

        let sequences = self.backend.scan(path).await?;
        tracing::debug!(path = %path, found = sequences.len(), "Scan finished");
        Ok(first_sequence(sequences)?)
    }
}
