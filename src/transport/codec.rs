//! Newline-delimited JSON framing for the worker's stdio.
//!
//! # Responsibilities
//! - Decode inbound `{ "id", "data": RequestEnvelope }` lines
//! - Encode outbound `{ "id", "data": ResponseEnvelope }` lines
//! - Serve a reader/writer pair through a `DispatchHandle`
//!
//! # Design Decisions
//! - Replies are written as they complete, in any order; `id` correlates them
//! - A single writer task owns the output, so lines never interleave
//! - Undecodable lines (bad JSON, bad UTF-8, no id) are logged and skipped;
//!   there is no id to answer
//! - Oversized lines are discarded while reading, never buffered whole
//! - The reader reserves a queue slot before taking the next line, so the
//!   service's limits push back on the input
//! - A `data` field that is not a valid envelope is still dispatched, with no
//!   route, so the peer gets `UNKNOWN_ROUTE` instead of silence

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::config::WorkerConfig;
use crate::ipc::{RequestEnvelope, ResponseEnvelope};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::transport::service::DispatchHandle;

/// A request line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub id: u64,
    #[serde(default)]
    pub data: RequestEnvelope,
}

/// A reply line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub id: u64,
    pub data: ResponseEnvelope,
}

/// Errors from the line codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("frame is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("frame has no numeric id")]
    MissingId,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            CodecError::TooLarge { .. } => "too_large",
            CodecError::Malformed(_) | CodecError::NotUtf8(_) => "malformed",
            CodecError::MissingId => "missing_id",
            CodecError::Io(_) => "io",
        }
    }
}

/// Decode one inbound line.
pub fn decode_frame(line: &str, max_bytes: usize) -> Result<InboundFrame, CodecError> {
    if line.len() > max_bytes {
        return Err(CodecError::TooLarge {
            size: line.len(),
            limit: max_bytes,
        });
    }

    let value: Value = serde_json::from_str(line)?;
    let id = value
        .get("id")
        .and_then(Value::as_u64)
        .ok_or(CodecError::MissingId)?;

    let data = match value.get("data") {
        None => RequestEnvelope::default(),
        Some(data) => RequestEnvelope::deserialize(data).unwrap_or_else(|e| {
            tracing::debug!(frame_id = id, error = %e, "Envelope has unexpected shape");
            RequestEnvelope {
                route: None,
                payload: data.get("payload").filter(|p| !p.is_null()).cloned(),
            }
        }),
    };

    Ok(InboundFrame { id, data })
}

/// Encode one outbound frame as a newline-terminated line.
pub fn encode_frame(frame: &OutboundFrame) -> Result<String, CodecError> {
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    Ok(line)
}

/// Read request lines from `reader` until EOF or shutdown, dispatch each
/// through `handle`, and write replies to `writer`.
///
/// After input ends, replies still outstanding are written for up to
/// `drain_timeout_secs` before returning.
pub async fn serve_lines<R, W>(
    mut reader: R,
    writer: W,
    handle: DispatchHandle,
    config: &WorkerConfig,
    shutdown: Shutdown,
) -> Result<(), CodecError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundFrame>();
    let writer_task = tokio::spawn(write_frames(writer, out_rx));

    let mut received: u64 = 0;
    loop {
        let line = tokio::select! {
            _ = shutdown.wait() => break,
            line = read_line(&mut reader, config.max_frame_bytes) => line?,
        };
        let line = match line {
            None => {
                tracing::debug!(received, "Input closed");
                break;
            }
            Some(RawLine::TooLong(size)) => {
                let e = CodecError::TooLarge {
                    size,
                    limit: config.max_frame_bytes,
                };
                tracing::warn!(error = %e, "Rejected inbound frame");
                metrics::record_frame_rejected(e.reason());
                continue;
            }
            Some(RawLine::Line(bytes)) => bytes,
        };
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let frame = match std::str::from_utf8(&line)
            .map_err(CodecError::from)
            .and_then(|text| decode_frame(text, config.max_frame_bytes))
        {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected inbound frame");
                metrics::record_frame_rejected(e.reason());
                continue;
            }
        };
        received += 1;

        // Wait for queue room before reading further input.
        let permit = tokio::select! {
            _ = shutdown.wait() => break,
            permit = handle.reserve() => match permit {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::warn!(frame_id = frame.id, error = %e, "Dispatch service unavailable");
                    break;
                }
            },
        };

        let out_tx = out_tx.clone();
        tokio::spawn(async move {
            match permit.request(frame.data).await {
                Ok(data) => {
                    let _ = out_tx.send(OutboundFrame { id: frame.id, data });
                }
                Err(e) => tracing::warn!(frame_id = frame.id, error = %e, "No reply for frame"),
            }
        });
    }

    drop(out_tx);
    let drain = Duration::from_secs(config.drain_timeout_secs);
    match tokio::time::timeout(drain, writer_task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(CodecError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            join_err,
        ))),
        Err(_) => {
            tracing::warn!("Drain deadline reached with replies outstanding");
            Ok(())
        }
    }
}

/// One line read from the input, without its terminator.
#[derive(Debug, PartialEq)]
enum RawLine {
    Line(Vec<u8>),
    /// Longer than the limit; the bytes were discarded. Carries the length.
    TooLong(usize),
}

/// Read up to the next `\n`, keeping at most `max_bytes` in memory.
///
/// Returns `None` at EOF when nothing was read. A trailing `\r` is dropped.
async fn read_line<R>(reader: &mut R, max_bytes: usize) -> std::io::Result<Option<RawLine>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut size = 0usize;
    let mut read_any = false;

    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                if !read_any {
                    return Ok(None);
                }
                break;
            }
            let (len, used, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i, i + 1, true),
                None => (available.len(), available.len(), false),
            };
            size += len;
            if size <= max_bytes {
                buf.extend_from_slice(&available[..len]);
            } else if !buf.is_empty() {
                buf = Vec::new();
            }
            (used, done)
        };
        reader.consume(used);
        read_any = true;
        if done {
            break;
        }
    }

    if buf.last() == Some(&b'\r') {
        buf.pop();
        size -= 1;
    }
    if size > max_bytes {
        return Ok(Some(RawLine::TooLong(size)));
    }
    Ok(Some(RawLine::Line(buf)))
}

async fn write_frames<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<OutboundFrame>) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = rx.recv().await {
        let line = encode_frame(&frame)?;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        tracing::trace!(frame_id = frame.id, success = frame.data.success, "Reply written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_request_line() {
        let frame = decode_frame(r#"{"id":3,"data":{"route":"ping","payload":{}}}"#, 1024).unwrap();
        assert_eq!(frame.id, 3);
        assert_eq!(frame.data, RequestEnvelope::new("ping", json!({})));
    }

    #[test]
    fn test_decode_without_data() {
        let frame = decode_frame(r#"{"id":1}"#, 1024).unwrap();
        assert_eq!(frame.data, RequestEnvelope::default());
    }

    #[test]
    fn test_decode_odd_envelope_drops_route() {
        let frame = decode_frame(r#"{"id":1,"data":{"route":5,"payload":"x"}}"#, 1024).unwrap();
        assert_eq!(frame.data.route, None);
        assert_eq!(frame.data.payload, Some(json!("x")));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode_frame("not json", 1024), Err(CodecError::Malformed(_))));
        assert!(matches!(decode_frame(r#"{"data":{}}"#, 1024), Err(CodecError::MissingId)));
        assert!(matches!(
            decode_frame(r#"{"id":1}"#, 4),
            Err(CodecError::TooLarge { size: 8, limit: 4 })
        ));
    }

    #[tokio::test]
    async fn test_read_line_splits_and_strips() {
        let mut input: &[u8] = b"one\r\ntwo\n\nlast";
        assert_eq!(read_line(&mut input, 16).await.unwrap(), Some(RawLine::Line(b"one".to_vec())));
        assert_eq!(read_line(&mut input, 16).await.unwrap(), Some(RawLine::Line(b"two".to_vec())));
        assert_eq!(read_line(&mut input, 16).await.unwrap(), Some(RawLine::Line(Vec::new())));
        assert_eq!(read_line(&mut input, 16).await.unwrap(), Some(RawLine::Line(b"last".to_vec())));
        assert_eq!(read_line(&mut input, 16).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_discards_long_lines() {
        let long = vec![b'x'; 100];
        let mut data = long.clone();
        data.extend_from_slice(b"\nok\n");
        let mut input = tokio::io::BufReader::with_capacity(8, &data[..]);

        assert_eq!(read_line(&mut input, 10).await.unwrap(), Some(RawLine::TooLong(100)));
        assert_eq!(read_line(&mut input, 10).await.unwrap(), Some(RawLine::Line(b"ok".to_vec())));
        assert_eq!(read_line(&mut input, 10).await.unwrap(), None);
    }

    #[test]
    fn test_not_utf8_is_malformed() {
        let e = CodecError::from(std::str::from_utf8(b"\xff\xfe").unwrap_err());
        assert_eq!(e.reason(), "malformed");
    }

    #[test]
    fn test_encode_is_one_line() {
        let line = encode_frame(&OutboundFrame {
            id: 9,
            data: ResponseEnvelope::ok(json!("a\nb")),
        })
        .unwrap();
        assert_eq!(line, "{\"id\":9,\"data\":{\"success\":true,\"message\":\"a\\nb\"}}\n");
    }
}
