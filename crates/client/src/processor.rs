//! Status-channel frame processing loop.
//!
//! Reads raw frames from a live connection, decodes text frames into
//! [`JobEvent`]s and forwards them, in receipt order, to the single
//! consumer of the channel.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use seqconv_core::job_events::JobEvent;

use crate::channel::ChannelNotice;
use crate::client::WsStream;

/// Why [`process_frames`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The connection closed or failed; reconnect.
    Closed,
    /// The receiving side was dropped; stop for good.
    ConsumerGone,
}

/// Forward decoded events until the connection ends.
///
/// Malformed frames are dropped; they never end the loop.
pub async fn process_frames(ws_stream: &mut WsStream, notices: &mpsc::Sender<ChannelNotice>) -> StreamEnd {
    while let Some(frame) = ws_stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let Some(event) = decode_frame(&text) else {
                    continue;
                };
                if notices.send(ChannelNotice::Event(event)).await.is_err() {
                    return StreamEnd::ConsumerGone;
                }
            }
            Ok(Message::Binary(_)) => {
                tracing::trace!("Ignoring binary frame on status channel");
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Handled automatically by tungstenite.
            }
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "Status channel closed by backend");
                break;
            }
            Ok(Message::Frame(_)) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Status channel receive error");
                break;
            }
        }
    }
    StreamEnd::Closed
}

fn decode_frame(text: &str) -> Option<JobEvent> {
    match JobEvent::parse(text) {
        Ok(event) => {
            tracing::trace!(kind = event.kind(), "Job event");
            Some(event)
        }
        Err(e) => {
            tracing::debug!(error = %e, raw_frame = %text, "Dropping malformed status frame");
            None
        }
    }
}
