//! Job lifecycle controller.
//!
//! [`JobController`] owns the [`SessionState`] and is the single
//! consumer of channel notices. Operator commands (select a folder,
//! change codec, run, cancel) and channel events both go through it, so
//! every lifecycle change happens in one place and one at a time.
//!
//! Launch is optimistic: the session enters `Running` before the
//! convert request is sent and drops back to `Idle` if it fails.
//! Cancel is not: the session stays `Running` until the backend
//! confirms with a terminal event.

use std::sync::Arc;

use tokio::task::JoinHandle;

use seqconv_core::error::CoreError;
use seqconv_core::job_config::JobForm;
use seqconv_core::sequence::SequenceDescriptor;
use seqconv_core::session::{LogLevel, SessionState, Transition};
use seqconv_core::settings::SettingsRecord;

use crate::api::{ApiError, ConverterBackend};
use crate::channel::ChannelNotice;
use crate::scanner::{ScanError, SequenceScanner};
use crate::settings::SettingsBridge;

/// Errors from operator commands.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("a job is already running")]
    AlreadyRunning,

    #[error("no job is running")]
    NotRunning,

    #[error(transparent)]
    Validation(CoreError),

    #[error("failed to start job: {0}")]
    Launch(#[source] ApiError),

    #[error("failed to cancel job: {0}")]
    Cancel(#[source] ApiError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Conflict(CoreError),
}

pub struct JobController {
    backend: Arc<dyn ConverterBackend>,
    settings: SettingsBridge,
    scanner: SequenceScanner,
    state: SessionState,
    /// Last settings record loaded or saved; unknown keys ride along.
    settings_base: SettingsRecord,
    /// Most recent detached save. Each save waits for its predecessor.
    pending_save: Option<JoinHandle<()>>,
}

impl JobController {
    pub fn new(backend: Arc<dyn ConverterBackend>) -> Self {
        Self {
            settings: SettingsBridge::new(Arc::clone(&backend)),
            scanner: SequenceScanner::new(Arc::clone(&backend)),
            backend,
            state: SessionState::default(),
            settings_base: SettingsRecord::default(),
            pending_save: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Edit form fields that have no lifecycle rules attached.
    pub fn form_mut(&mut self) -> &mut JobForm {
        self.state.form_mut()
    }

    /// Fetch settings once and apply them to the form.
    pub async fn load_settings(&mut self) {
        let record = self.settings.load_or_default().await;
        self.state.apply_settings(&record);
        self.settings_base = record;
    }

    /// Choose the input folder, then scan it for a sequence.
    ///
    /// Refused while a job is running. A scan that finds nothing clears
    /// the detected sequence; a failed scan leaves the form as it was.
    pub async fn select_input_folder(
        &mut self,
        folder: &str,
    ) -> Result<Option<SequenceDescriptor>, ControllerError> {
        self.state
            .select_input_folder(folder)
            .map_err(ControllerError::Conflict)?;
        self.save_settings_detached();

        self.state
            .push_log(LogLevel::Info, format!("Scanning for sequences in: {folder}"));

        match self.scanner.scan(folder).await {
            Ok(Some(sequence)) => {
                self.state.push_log(
                    LogLevel::Success,
                    format!(
                        "Detected sequence: {} {}",
                        sequence.pattern, sequence.range_label
                    ),
                );
                self.state.form_mut().seed_from_sequence(&sequence);
                Ok(Some(sequence))
            }
            Ok(None) => {
                self.state
                    .push_log(LogLevel::Error, "No image sequences detected.");
                self.state.form_mut().clear_sequence();
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(folder = %folder, error = %e, "Sequence scan failed");
                self.state
                    .push_log(LogLevel::Error, format!("Scan failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Switch codec; the output filename's extension follows.
    pub fn set_codec(&mut self, codec: &str) {
        self.state.form_mut().apply_codec(codec);
    }

    /// Validate the form and launch a job.
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        if !self.state.can_run() {
            return Err(ControllerError::AlreadyRunning);
        }
        let config = self
            .state
            .form()
            .build()
            .map_err(ControllerError::Validation)?;

        self.state.begin_run();
        self.state.push_log(LogLevel::Info, "Starting job...");

        match self.backend.start_conversion(&config).await {
            Ok(ack) => {
                tracing::info!(
                    input_folder = %config.input_folder,
                    codec = %config.codec,
                    status = %ack.status,
                    "Job launched",
                );
                self.save_settings_detached();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Job launch failed");
                self.state
                    .push_log(LogLevel::Error, format!("Failed to start job: {e}"));
                self.state.finish_run();
                Err(ControllerError::Launch(e))
            }
        }
    }

    /// Ask the backend to cancel. The lifecycle does not change here.
    pub async fn cancel(&mut self) -> Result<(), ControllerError> {
        if !self.state.can_cancel() {
            return Err(ControllerError::NotRunning);
        }

        match self.backend.cancel_conversion().await {
            Ok(_) => {
                tracing::info!("Cancellation requested");
                Ok(())
            }
            Err(e) => {
                self.state
                    .push_log(LogLevel::Error, format!("Failed to cancel job: {e}"));
                Err(ControllerError::Cancel(e))
            }
        }
    }

    /// Apply one channel notice.
    pub fn handle_notice(&mut self, notice: &ChannelNotice) -> Transition {
        match notice {
            ChannelNotice::Status(connection) => {
                tracing::debug!(?connection, "Status channel");
                self.state.set_connection(*connection);
                Transition::Unchanged
            }
            ChannelNotice::Event(event) => {
                let transition = self.state.apply_event(event);
                if transition == Transition::EnteredIdle {
                    tracing::info!(kind = event.kind(), "Job finished");
                }
                transition
            }
        }
    }

    /// Wait for outstanding settings saves.
    pub async fn flush_settings(&mut self) {
        if let Some(handle) = self.pending_save.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Settings save task failed");
            }
        }
    }

    /// Save the form's settings without blocking the caller.
    fn save_settings_detached(&mut self) {
        let record = self.state.form().to_settings(&self.settings_base);
        self.settings_base = record.clone();

        let bridge = self.settings.clone();
        let previous = self.pending_save.take();
        self.pending_save = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    tracing::warn!(error = %e, "Previous settings save task failed");
                }
            }
            bridge.save_or_warn(&record).await;
        }));
    }
}
