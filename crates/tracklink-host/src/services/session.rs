// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-delimited JSON session.
//
// Each input line is one `HostCommand`; each output line is one
// `HostResponse`. Commands are dispatched as they arrive and responses are
// written in completion order, so a slow deferred command never holds up a
// later one. Every frame must carry the host's `id`; rejected frames echo it
// back whenever it can be read.

use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracklink_bridge::{Dispatcher, PendingCommand, Settled};
use tracklink_core::error::Result;
use tracklink_core::protocol::{Failure, FailureKind, HostCommand, HostResponse};
use tracklink_core::types::CommandId;

/// Run until `reader` is exhausted and every in-flight command has been
/// answered. Returns the number of response frames written.
///
/// A read error stops intake but still flushes every response already owed
/// before it is returned.
pub async fn run<R, W>(dispatcher: Dispatcher, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let wait_limit = dispatcher.config().pending_timeout();
    let (tx, mut rx) = mpsc::unbounded_channel::<HostResponse>();
    let mut tx = Some(tx);
    let mut frames = reader.split(b'\n');
    let mut read_error = None;
    let mut written = 0;

    loop {
        tokio::select! {
            frame = frames.next_segment(), if tx.is_some() => {
                let frame = match frame {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        debug!("host input closed");
                        tx = None;
                        continue;
                    }
                    Err(e) => {
                        error!(error = %e, "host input failed, draining in-flight commands");
                        read_error = Some(e);
                        tx = None;
                        continue;
                    }
                };
                let Some(sender) = &tx else { continue };
                handle_frame(&dispatcher, &frame, wait_limit, sender);
            }
            response = rx.recv() => {
                let Some(response) = response else { break };
                write_frame(&mut writer, &response).await?;
                written += 1;
            }
        }
    }

    info!(responses = written, "session finished");
    match read_error {
        Some(e) => Err(e.into()),
        None => Ok(written),
    }
}

fn handle_frame(
    dispatcher: &Dispatcher,
    frame: &[u8],
    wait_limit: Option<Duration>,
    sender: &mpsc::UnboundedSender<HostResponse>,
) {
    let command = match parse_frame(frame) {
        Ok(Some(command)) => command,
        Ok(None) => return,
        Err(rejected) => {
            // Receiver gone means the session is shutting down.
            let _ = sender.send(rejected);
            return;
        }
    };

    let pending = dispatcher.submit(command);
    let sender = sender.clone();
    tokio::spawn(async move {
        let response = settle(pending, wait_limit).await;
        let _ = sender.send(response);
    });
}

/// Decode one input line. `Ok(None)` for blank lines; `Err` carries the
/// failure frame to send back, under the host's id whenever it can be read.
fn parse_frame(frame: &[u8]) -> std::result::Result<Option<HostCommand>, HostResponse> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| reject(CommandId::new(), format!("malformed command frame: {e}")))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| reject(CommandId::new(), format!("malformed command frame: {e}")))?;

    let id = match value.get("id") {
        Some(raw) => serde_json::from_value::<CommandId>(raw.clone())
            .map_err(|e| reject(CommandId::new(), format!("malformed command id: {e}")))?,
        None => return Err(reject(CommandId::new(), "command frame has no id")),
    };

    let command: HostCommand = serde_json::from_value(value)
        .map_err(|e| reject(id, format!("malformed command frame: {e}")))?;
    Ok(Some(command))
}

fn reject(id: CommandId, message: impl Into<String>) -> HostResponse {
    let failure = Failure::new(FailureKind::InvalidArguments, message);
    warn!(%id, error = %failure.message, "rejected host frame");
    HostResponse::from_outcome(id, Err(failure))
}

async fn settle(pending: PendingCommand, wait_limit: Option<Duration>) -> HostResponse {
    let id = pending.id();
    let settled = match wait_limit {
        Some(limit) => pending.settle_within(limit).await,
        None => pending.settle().await,
    };

    let outcome = match settled {
        Settled::Resolved(outcome) => outcome,
        Settled::Abandoned => Err(Failure::new(
            FailureKind::ProviderFailure,
            "provider dropped the command without answering",
        )),
        Settled::TimedOut => {
            let secs = wait_limit.map(|d| d.as_secs()).unwrap_or_default();
            warn!(%id, secs, "gave up waiting on pending command");
            Err(Failure::new(
                FailureKind::ProviderFailure,
                format!("no answer within {secs}s"),
            ))
        }
    };

    HostResponse::from_outcome(id, outcome)
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, response: &HostResponse) -> Result<()> {
    let mut frame = serde_json::to_vec(response)?;
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use serde_json::{Value, json};
    use tracklink_bridge::RecordingProvider;
    use tracklink_core::BridgeConfig;
    use tracklink_core::protocol::ResponseBody;
    use tracklink_core::types::Platform;

    async fn run_session(provider: RecordingProvider, config: BridgeConfig, input: &str) -> Vec<Value> {
        run_bytes(provider, config, input.as_bytes()).await
    }

    async fn run_bytes(provider: RecordingProvider, config: BridgeConfig, input: &[u8]) -> Vec<Value> {
        let dispatcher = Dispatcher::new(Arc::new(provider), config);
        let mut output = Vec::new();
        let written = run(dispatcher, input, &mut output)
            .await
            .expect("session");
        let frames: Vec<Value> = String::from_utf8(output)
            .expect("utf8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json frame"))
            .collect();
        assert_eq!(frames.len(), written);
        frames
    }

    #[tokio::test]
    async fn answers_every_command_with_its_id() {
        let input = concat!(
            r#"{"id":"6f1c1f0e-9a55-4d7e-9d0a-3a7a2c3b8a11","command":"getDeviceId"}"#,
            "\n\n",
            r#"{"id":"0b7e4a2e-11d3-4b0c-8f6e-5c2a9d1e7f22","command":"setSleep","args":["no"]}"#,
            "\n",
        );
        let frames = run_session(
            RecordingProvider::immediate(Platform::Android).with_device_id("KAsim"),
            BridgeConfig::default(),
            input,
        )
        .await;

        assert_eq!(frames.len(), 2);
        let by_id = |id: &str| {
            frames
                .iter()
                .find(|f| f["id"] == json!(id))
                .cloned()
                .expect("frame for id")
        };
        let device = by_id("6f1c1f0e-9a55-4d7e-9d0a-3a7a2c3b8a11");
        assert_eq!(device["status"], json!("success"));
        assert_eq!(device["payload"], json!("KAsim"));

        let sleep = by_id("0b7e4a2e-11d3-4b0c-8f6e-5c2a9d1e7f22");
        assert_eq!(sleep["status"], json!("failure"));
        assert_eq!(sleep["error"]["kind"], json!("invalid_arguments"));
    }

    #[tokio::test]
    async fn malformed_frame_gets_failure() {
        let frames = run_session(
            RecordingProvider::immediate(Platform::Ios),
            BridgeConfig::default(),
            "not json\n",
        )
        .await;
        let response: HostResponse = serde_json::from_value(frames[0].clone()).expect("frame");
        match response.body {
            ResponseBody::Failure { error } => {
                assert_eq!(error.kind, FailureKind::InvalidArguments)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn unanswered_command_times_out() {
        let config = BridgeConfig {
            pending_timeout_secs: Some(1),
            ..BridgeConfig::default()
        };
        let frames = run_session(
            RecordingProvider::deferred(Platform::Android),
            config,
            "{\"id\":\"6f1c1f0e-9a55-4d7e-9d0a-3a7a2c3b8a11\",\"command\":\"getStarted\"}\n",
        )
        .await;
        assert_eq!(frames[0]["status"], json!("failure"));
        assert_eq!(frames[0]["error"]["message"], json!("no answer within 1s"));
    }

    const DEVICE_ID: &str = "6f1c1f0e-9a55-4d7e-9d0a-3a7a2c3b8a11";
    const SLEEP_ID: &str = "0b7e4a2e-11d3-4b0c-8f6e-5c2a9d1e7f22";

    #[tokio::test]
    async fn invalid_utf8_line_is_rejected_and_session_continues() {
        let mut input = Vec::new();
        input.extend_from_slice(format!(r#"{{"id":"{DEVICE_ID}","command":"getDeviceId"}}"#).as_bytes());
        input.push(b'\n');
        input.extend_from_slice(br#"{"id":"1d2c3b4a-0000-4000-8000-000000000001","command":"sendEvent","args":[""#);
        input.push(0xFF);
        input.extend_from_slice(b"\"]}\n");
        input.extend_from_slice(format!(r#"{{"id":"{SLEEP_ID}","command":"setSleep","args":[true]}}"#).as_bytes());
        input.push(b'\n');

        let frames = run_bytes(
            RecordingProvider::immediate(Platform::Android),
            BridgeConfig::default(),
            &input,
        )
        .await;

        assert_eq!(frames.len(), 3);
        let status = |id: &str| {
            frames
                .iter()
                .find(|f| f["id"] == json!(id))
                .map(|f| f["status"].clone())
                .expect("frame for id")
        };
        assert_eq!(status(DEVICE_ID), json!("success"));
        assert_eq!(status(SLEEP_ID), json!("success"));

        let rejected = frames
            .iter()
            .find(|f| f["status"] == json!("failure"))
            .expect("failure frame");
        assert_eq!(rejected["error"]["kind"], json!("invalid_arguments"));
        assert!(
            rejected["error"]["message"]
                .as_str()
                .expect("message")
                .starts_with("malformed command frame")
        );
    }

    #[tokio::test]
    async fn undecodable_command_echoes_host_id() {
        let input = format!(r#"{{"id":"{DEVICE_ID}","command":"sendEvent","args":"purchase"}}"#);
        let frames = run_session(
            RecordingProvider::immediate(Platform::Ios),
            BridgeConfig::default(),
            &format!("{input}\n"),
        )
        .await;

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["id"], json!(DEVICE_ID));
        assert_eq!(frames[0]["status"], json!("failure"));
        assert_eq!(frames[0]["error"]["kind"], json!("invalid_arguments"));
    }

    #[tokio::test]
    async fn frame_without_id_is_not_dispatched() {
        let provider = Arc::new(RecordingProvider::immediate(Platform::Android));
        let dispatcher = Dispatcher::new(provider.clone(), BridgeConfig::default());
        let mut output = Vec::new();
        let written = run(
            dispatcher,
            "{\"command\":\"setSleep\",\"args\":[true]}\n".as_bytes(),
            &mut output,
        )
        .await
        .expect("session");

        assert_eq!(written, 1);
        let frame: Value = serde_json::from_slice(output.trim_ascii_end()).expect("json frame");
        assert_eq!(frame["error"]["message"], json!("command frame has no id"));
        assert_eq!(provider.call_count(), 0);
    }
}
