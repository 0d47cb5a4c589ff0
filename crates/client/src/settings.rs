//! Load and save the backend-held settings record.

use std::sync::Arc;

use seqconv_core::settings::SettingsRecord;

use crate::api::{ApiError, ConverterBackend};

/// Thin request/response wrapper around the settings endpoints.
///
/// Every call is a single attempt; failures are returned or logged,
/// never retried.
#[derive(Clone)]
pub struct SettingsBridge {
    backend: Arc<dyn ConverterBackend>,
}

impl SettingsBridge {
    pub fn new(backend: Arc<dyn ConverterBackend>) -> Self {
        Self { backend }
    }

    pub async fn load(&self) -> Result<SettingsRecord, ApiError> {
        self.backend.load_settings().await
    }

    /// Load settings, falling back to the client defaults on failure.
    pub async fn load_or_default(&self) -> SettingsRecord {
        match self.load().await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load settings, using defaults");
                SettingsRecord::default()
            }
        }
    }

    pub async fn save(&self, record: &SettingsRecord) -> Result<(), ApiError> {
        self.backend.save_settings(record).await
    }

    /// Save settings, logging instead of returning a failure.
    pub async fn save_or_warn(&self, record: &SettingsRecord) {
        match self.save(record).await {
            Ok(()) => tracing::debug!("Settings saved"),
            Err(e) => tracing::warn!(error = %e, "Failed to save settings"),
        }
    }
}
