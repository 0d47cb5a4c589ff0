//! Client-side job lifecycle state machine.
//!
//! [`SessionState`] is the single owner of everything with cross-event
//! memory: lifecycle, progress, the operator log, channel connectivity
//! and the job form. Transitions are plain methods; the network side
//! (launch, cancel) lives in the client crate's `JobController`, which
//! owns one `SessionState` and calls into it.
//!
//! ```text
//!   Idle --begin_run--> Running
//!   Running --job_status=idle | success | cancelled--> Idle
//!   Running --launch failure (finish_run)--> Idle
//! ```

use chrono::Utc;

use crate::browse::default_output_folder;
use crate::error::CoreError;
use crate::job_config::JobForm;
use crate::job_events::JobEvent;
use crate::settings::SettingsRecord;
use crate::types::Timestamp;

/// Coarse job lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobLifecycle {
    #[default]
    Idle,
    Running,
}

/// Status of the backend event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Classification of an operator log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Output,
    Error,
    Success,
}

/// One line in the operator-facing job log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
    pub at: Timestamp,
}

/// What handling an event did to the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    /// A terminal event moved the session from `Running` to `Idle`.
    EnteredIdle,
}

/// The whole client session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    lifecycle: JobLifecycle,
    progress: f64,
    log: Vec<LogLine>,
    connection: ConnectionState,
    form: JobForm,
}

impl SessionState {
    pub fn new(form: JobForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn lifecycle(&self) -> JobLifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == JobLifecycle::Running
    }

    /// Progress percentage, `0.0..=100.0`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn log(&self) -> &[LogLine] {
        &self.log
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn form(&self) -> &JobForm {
        &self.form
    }

    /// Mutable access for fields other than the input folder.
    pub fn form_mut(&mut self) -> &mut JobForm {
        &mut self.form
    }

    // ---- gating ----

    pub fn can_run(&self) -> bool {
        self.lifecycle == JobLifecycle::Idle
    }

    pub fn can_cancel(&self) -> bool {
        self.lifecycle == JobLifecycle::Running
    }

    pub fn input_folder_editable(&self) -> bool {
        self.lifecycle == JobLifecycle::Idle
    }

    /// Short status line for the current lifecycle.
    pub fn status_label(&self) -> &'static str {
        match self.lifecycle {
            JobLifecycle::Idle => "Ready",
            JobLifecycle::Running => "Processing...",
        }
    }

    // ---- form changes that depend on lifecycle ----

    /// Select a new input folder; the output folder follows it.
    pub fn select_input_folder(&mut self, folder: &str) -> Result<(), CoreError> {
        if !self.input_folder_editable() {
            return Err(CoreError::Conflict(
                "input folder cannot change while a job is running".into(),
            ));
        }
        self.form.set_input_folder(folder);
        self.form.output_folder = default_output_folder(folder);
        Ok(())
    }

    /// Apply loaded settings to the form.
    ///
    /// The input folder is left alone while a job is running.
    pub fn apply_settings(&mut self, settings: &SettingsRecord) {
        let input = self.form.input_folder().to_string();
        self.form.apply_settings(settings);
        if !self.input_folder_editable() {
            self.form.set_input_folder(&input);
        }
    }

    // ---- transitions ----

    /// Enter `Running`: progress and log are cleared.
    pub fn begin_run(&mut self) {
        self.lifecycle = JobLifecycle::Running;
        self.progress = 0.0;
        self.log.clear();
    }

    /// Enter `Idle`: progress resets, the log is kept.
    pub fn finish_run(&mut self) {
        self.lifecycle = JobLifecycle::Idle;
        self.progress = 0.0;
    }

    pub fn set_connection(&mut self, connection: ConnectionState) {
        self.connection = connection;
    }

    pub fn push_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log.push(LogLine {
            level,
            message: message.into(),
            at: Utc::now(),
        });
    }

    /// Apply one channel event.
    ///
    /// Output and error lines are logged in any state. Progress and
    /// terminal events only act while `Running`; nothing here can move
    /// the session into `Running`.
    pub fn apply_event(&mut self, event: &JobEvent) -> Transition {
        match event {
            JobEvent::Output(text) => {
                self.push_log(LogLevel::Output, text.clone());
                Transition::Unchanged
            }
            JobEvent::Error(text) => {
                self.push_log(LogLevel::Error, text.clone());
                Transition::Unchanged
            }
            JobEvent::Progress(_) => {
                if let (true, Some(percent)) = (self.is_running(), event.progress_percent()) {
                    self.progress = percent;
                }
                Transition::Unchanged
            }
            JobEvent::JobStatus(_) => self.finish_if_running(event),
            JobEvent::Success(text) => {
                if self.is_running() {
                    self.push_log(LogLevel::Success, text.clone());
                }
                self.finish_if_running(event)
            }
            JobEvent::Cancelled(text) => {
                if self.is_running() {
                    self.push_log(LogLevel::Error, text.clone());
                }
                self.finish_if_running(event)
            }
        }
    }

    fn finish_if_running(&mut self, event: &JobEvent) -> Transition {
        if self.is_running() && event.is_terminal() {
            self.finish_run();
            Transition::EnteredIdle
        } else {
            Transition::Unchanged
        }
    }
}
