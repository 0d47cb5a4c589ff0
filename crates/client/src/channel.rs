//! Persistent, self-healing status channel.
//!
//! [`JobChannel::spawn`] starts one background task that connects to the
//! backend's status WebSocket, forwards decoded events and reconnects
//! after a fixed delay whenever the connection drops. Everything the
//! task observes reaches the single consumer as a [`ChannelNotice`] on
//! an mpsc queue, in receipt order.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use seqconv_core::job_events::JobEvent;
use seqconv_core::session::ConnectionState;

use crate::client::StatusSocket;
use crate::processor::{process_frames, StreamEnd};
use crate::reconnect::ReconnectTimer;

/// Queue capacity between the channel task and its consumer.
const NOTICE_CHANNEL_CAPACITY: usize = 256;

/// How long [`JobChannel::shutdown`] waits for the task to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// What the channel task reports to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelNotice {
    Status(ConnectionState),
    Event(JobEvent),
}

/// Handle to the running channel task.
pub struct JobChannel {
    cancel: CancellationToken,
    task_handle: tokio::task::JoinHandle<()>,
}

impl JobChannel {
    /// Start the connect, process, reconnect loop.
    ///
    /// The returned receiver is the only way to observe the channel.
    /// Dropping it stops the task at the next notice.
    pub fn spawn(
        socket: StatusSocket,
        reconnect_delay: Duration,
    ) -> (Self, mpsc::Receiver<ChannelNotice>) {
        let (notice_tx, notice_rx) = mpsc::channel(NOTICE_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task_handle = tokio::spawn(async move {
            tracing::info!(url = %socket.ws_url(), "Starting status channel task");
            run_channel_loop(&socket, reconnect_delay, &notice_tx, &task_cancel).await;
            tracing::info!("Status channel task exited");
        });

        (
            Self {
                cancel,
                task_handle,
            },
            notice_rx,
        )
    }

    /// Stop the task, including any pending reconnect.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.task_handle)
            .await
            .is_err()
        {
            tracing::warn!("Status channel task did not exit in time");
        }
    }
}

/// Core loop: connect, process frames, wait out the reconnect delay.
///
/// Runs until cancelled or until the consumer drops its receiver.
async fn run_channel_loop(
    socket: &StatusSocket,
    reconnect_delay: Duration,
    notices: &mpsc::Sender<ChannelNotice>,
    cancel: &CancellationToken,
) {
    let (wake_tx, mut wake_rx) = mpsc::channel(1);
    let mut timer = ReconnectTimer::new(reconnect_delay, wake_tx);

    loop {
        if !report(notices, ConnectionState::Connecting).await {
            return;
        }

        let connected = tokio::select! {
            _ = cancel.cancelled() => return,
            result = socket.connect() => result,
        };

        match connected {
            Ok(mut ws_stream) => {
                // A live connection supersedes any armed attempt.
                timer.cancel();
                if !report(notices, ConnectionState::Connected).await {
                    return;
                }

                let end = tokio::select! {
                    _ = cancel.cancelled() => return,
                    end = process_frames(&mut ws_stream, notices) => end,
                };
                if end == StreamEnd::ConsumerGone {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Status channel connect failed");
            }
        }

        if !report(notices, ConnectionState::Disconnected).await {
            return;
        }

        timer.schedule();
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = wake_rx.recv() => timer.acknowledge(),
        }
    }
}

/// Send a status notice; `false` when the consumer is gone.
async fn report(notices: &mpsc::Sender<ChannelNotice>, state: ConnectionState) -> bool {
    notices.send(ChannelNotice::Status(state)).await.is_ok()
}
