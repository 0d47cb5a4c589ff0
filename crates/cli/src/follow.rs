//! Following a job on the status channel from the terminal.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use seqconv_client::channel::{ChannelNotice, JobChannel};
use seqconv_client::client::StatusSocket;
use seqconv_client::config::ClientConfig;
use seqconv_client::controller::JobController;
use seqconv_core::job_events::JobEvent;
use seqconv_core::session::{ConnectionState, LogLevel, LogLine, Transition};

/// How long to wait for the status channel before launching anyway.
const CONNECT_GRACE: Duration = Duration::from_secs(10);

pub fn print_log(lines: &[LogLine]) {
    for line in lines {
        print_line(line);
    }
}

fn print_line(line: &LogLine) {
    let tag = match line.level {
        LogLevel::Info => "info",
        LogLevel::Output => "out",
        LogLevel::Error => "error",
        LogLevel::Success => "done",
    };
    println!(
        "[{}] {tag:>5} {}",
        line.at.format("%H:%M:%S"),
        line.message.trim_end()
    );
}

/// Print lines past `printed` and return the new count.
fn print_new(lines: &[LogLine], printed: usize) -> usize {
    if let Some(fresh) = lines.get(printed..) {
        print_log(fresh);
    }
    lines.len()
}

/// Launch the configured job and stream its log until it ends.
///
/// Ctrl-C sends one cancel request and keeps following until the
/// backend confirms.
pub async fn run_and_follow(controller: &mut JobController, config: &ClientConfig) -> Result<()> {
    let (channel, mut notices) = JobChannel::spawn(
        StatusSocket::new(config.ws_url.clone()),
        config.reconnect_delay,
    );

    let result = follow_job(controller, &mut notices).await;

    controller.flush_settings().await;
    channel.shutdown().await;
    result
}

async fn follow_job(
    controller: &mut JobController,
    notices: &mut mpsc::Receiver<ChannelNotice>,
) -> Result<()> {
    wait_until_connected(controller, notices).await;

    let launched = controller.run().await;
    print_log(controller.state().log());
    let mut printed = controller.state().log().len();
    launched?;
    eprintln!("status: {}", controller.state().status_label());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancel_sent = false;
    let mut last_percent = None;

    loop {
        tokio::select! {
            notice = notices.recv() => {
                let notice = notice.context("status channel stopped")?;
                let transition = controller.handle_notice(&notice);
                printed = print_new(controller.state().log(), printed);

                match &notice {
                    ChannelNotice::Status(ConnectionState::Disconnected) => {
                        tracing::warn!("Status channel lost, reconnecting");
                    }
                    ChannelNotice::Event(JobEvent::Progress(_)) if controller.state().is_running() => {
                        let percent = controller.state().progress().floor() as u8;
                        if last_percent != Some(percent) {
                            last_percent = Some(percent);
                            eprintln!("progress: {percent}%");
                        }
                    }
                    _ => {}
                }

                if transition == Transition::EnteredIdle {
                    eprintln!("status: {}", controller.state().status_label());
                    return match notice {
                        ChannelNotice::Event(JobEvent::Success(_)) => Ok(()),
                        ChannelNotice::Event(JobEvent::Cancelled(_)) => {
                            anyhow::bail!("job was cancelled")
                        }
                        _ => anyhow::bail!("job ended without a success message"),
                    };
                }
            }
            signal = &mut ctrl_c, if !cancel_sent => {
                signal.context("listening for Ctrl-C")?;
                cancel_sent = true;
                eprintln!("Cancelling, waiting for the backend to confirm...");
                if let Err(e) = controller.cancel().await {
                    tracing::warn!(error = %e, "Cancel request failed");
                }
                printed = print_new(controller.state().log(), printed);
            }
        }
    }
}

/// Feed notices to the controller until the channel reports connected,
/// so no event of the job is missed. Gives up after [`CONNECT_GRACE`].
async fn wait_until_connected(
    controller: &mut JobController,
    notices: &mut mpsc::Receiver<ChannelNotice>,
) {
    let connected = tokio::time::timeout(CONNECT_GRACE, async {
        while let Some(notice) = notices.recv().await {
            controller.handle_notice(&notice);
            if notice == ChannelNotice::Status(ConnectionState::Connected) {
                return true;
            }
        }
        false
    })
    .await;

    if !matches!(connected, Ok(true)) {
        tracing::warn!("Status channel not connected, launching anyway");
    }
}

/// Print every status-channel notice until Ctrl-C.
pub async fn watch(config: &ClientConfig) -> Result<()> {
    let (channel, mut notices) = JobChannel::spawn(
        StatusSocket::new(config.ws_url.clone()),
        config.reconnect_delay,
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            notice = notices.recv() => match notice {
                Some(ChannelNotice::Status(state)) => eprintln!("channel: {state:?}"),
                Some(ChannelNotice::Event(event)) => {
                    println!("{:>10} {}", event.kind(), event.content().trim_end());
                }
                None => break,
            },
            signal = &mut ctrl_c => {
                signal.context("listening for Ctrl-C")?;
                break;
            }
        }
    }

    channel.shutdown().await;
    Ok(())
}
