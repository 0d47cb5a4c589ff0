//! Scripted in-memory backend for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use seqconv_core::browse::{BrowseEntry, BrowseResult};
use seqconv_core::job_config::JobConfig;
use seqconv_core::sequence::SequenceDescriptor;
use seqconv_core::settings::SettingsRecord;

use crate::api::{Ack, ApiError, ConverterBackend, DependencyStatus};

/// Configure the public fields, wrap it in an `Arc`, then inspect the
/// recorded calls.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub settings: SettingsRecord,
    pub fail_settings: bool,
    pub listings: HashMap<String, BrowseResult>,
    pub scans: HashMap<String, Vec<SequenceDescriptor>>,
    pub fail_scan: bool,
    /// `(status, detail)` returned by the convert endpoint.
    pub launch_error: Option<(u16, String)>,
    pub fail_cancel: bool,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) saved: Mutex<Vec<SettingsRecord>>,
    pub(crate) launched: Mutex<Vec<JobConfig>>,
}

impl FakeBackend {
    pub fn with_settings(settings: SettingsRecord) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn add_listing(&mut self, result: BrowseResult) {
        self.listings.insert(result.current_path.clone(), result);
    }

    /// Serve the listing of `target` for requests to `alias`.
    pub fn alias_listing(&mut self, alias: &str, target: &str) {
        if let Some(result) = self.listings.get(target).cloned() {
            self.listings.insert(alias.to_string(), result);
        }
    }

    pub fn add_scan(&mut self, path: &str, sequences: Vec<SequenceDescriptor>) {
        self.scans.insert(path.to_string(), sequences);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn saved_settings(&self) -> Vec<SettingsRecord> {
        self.saved.lock().unwrap().clone()
    }

    pub fn launched(&self) -> Vec<JobConfig> {
        self.launched.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

fn status(status: u16, body: &str) -> ApiError {
    ApiError::Status {
        status,
        body: body.to_string(),
    }
}

fn ack(status: &str) -> Ack {
    Ack {
        status: status.to_string(),
    }
}

#[async_trait]
impl ConverterBackend for FakeBackend {
    async fn load_settings(&self) -> Result<SettingsRecord, ApiError> {
        self.record("load_settings");
        if self.fail_settings {
            return Err(status(500, "settings store unavailable"));
        }
        Ok(self.settings.clone())
    }

    async fn save_settings(&self, record: &SettingsRecord) -> Result<(), ApiError> {
        self.record("save_settings");
        if self.fail_settings {
            return Err(status(500, "settings store unavailable"));
        }
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn browse(&self, path: &str) -> Result<BrowseResult, ApiError> {
        self.record(format!("browse:{path}"));
        self.listings
            .get(path)
            .cloned()
            .ok_or_else(|| status(404, "Path not found"))
    }

    async fn scan(&self, path: &str) -> Result<Vec<SequenceDescriptor>, ApiError> {
        self.record(format!("scan:{path}"));
        if self.fail_scan {
            return Err(status(500, "scan exploded"));
        }
        Ok(self.scans.get(path).cloned().unwrap_or_default())
    }

    async fn start_conversion(&self, config: &JobConfig) -> Result<Ack, ApiError> {
        self.record("convert");
        if let Some((code, detail)) = &self.launch_error {
            return Err(status(*code, detail));
        }
        self.launched.lock().unwrap().push(config.clone());
        Ok(ack("started"))
    }

    async fn cancel_conversion(&self) -> Result<Ack, ApiError> {
        self.record("cancel");
        if self.fail_cancel {
            return Err(status(500, "cancel failed"));
        }
        Ok(ack("cancelling"))
    }

    async fn dependency_status(&self) -> Result<DependencyStatus, ApiError> {
        self.record("deps");
        Ok(DependencyStatus {
            ok: true,
            issues: Vec::new(),
            details: BTreeMap::new(),
        })
    }

    async fn cleanup(&self) -> Result<Ack, ApiError> {
        self.record("cleanup");
        Ok(ack("cleanup_triggered"))
    }
}

pub(crate) fn dir_entry(path: &str) -> BrowseEntry {
    entry(path, true)
}

pub(crate) fn file_entry(path: &str) -> BrowseEntry {
    entry(path, false)
}

fn entry(path: &str, is_directory: bool) -> BrowseEntry {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    BrowseEntry {
        name,
        path: path.to_string(),
        is_directory,
        size: None,
        extension: None,
    }
}

pub(crate) fn shot_a() -> SequenceDescriptor {
    SequenceDescriptor {
        pattern: "shotA.%04d.exr".into(),
        head: "shotA.".into(),
        tail: ".exr".into(),
        padding: 4,
        start_frame: 1001,
        end_frame: 1240,
        count: 240,
        range_label: "1001-1240".into(),
    }
}
