//! SSE decoding of OpenAI chat-completion chunks into host stream parts.
//!
//! SSE format: `data: {"choices":[{"delta":{"content":"hi"}}]}\n\n`,
//! terminated by `data: [DONE]`.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use lmproxy_core::{HostError, PartStream, StreamPart};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct Chunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallDelta>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: u64,
    id: Option<String>,
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

/// A tool call being assembled from deltas.
#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn finish(self) -> Result<StreamPart, HostError> {
        let input = if self.arguments.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&self.arguments).map_err(|e| {
                HostError::Stream(format!(
                    "tool call {} has invalid arguments: {e}",
                    self.name
                ))
            })?
        };
        Ok(StreamPart::tool_call(self.id, self.name, input))
    }
}

/// State threaded through the `unfold` stream.
struct DecodeState {
    stream: futures_util::stream::BoxStream<'static, Result<Bytes, String>>,
    buf: BytesMut,
    tool_calls: BTreeMap<u64, PartialToolCall>,
    ready: VecDeque<Result<StreamPart, HostError>>,
    cancel: CancellationToken,
    done: bool,
}

impl DecodeState {
    /// Handle one SSE line. Returns `true` on the termination signal.
    fn feed_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();

        // Empty lines and SSE comments.
        if trimmed.is_empty() || trimmed.starts_with(':') {
            return false;
        }

        let Some(data) = trimmed.strip_prefix("data:") else {
            return false;
        };
        let data = data.trim();

        if data == "[DONE]" {
            return true;
        }

        match serde_json::from_str::<Chunk>(data) {
            Ok(chunk) => self.feed_chunk(chunk),
            Err(e) => {
                warn!("Skipping undecodable SSE chunk: {e}");
                false
            }
        }
    }

    fn feed_chunk(&mut self, chunk: Chunk) -> bool {
        if let Some(error) = chunk.error {
            let message = error["message"]
                .as_str()
                .map_or_else(|| error.to_string(), str::to_string);
            self.ready.push_back(Err(HostError::Request(message)));
            return true;
        }

        for choice in chunk.choices {
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                self.ready.push_back(Ok(StreamPart::text(content)));
            }
            for delta in choice.delta.tool_calls {
                let call = self.tool_calls.entry(delta.index).or_default();
                if let Some(id) = delta.id {
                    call.id = id;
                }
                if let Some(function) = delta.function {
                    if let Some(name) = function.name {
                        call.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        call.arguments.push_str(&arguments);
                    }
                }
            }
        }
        false
    }

    /// Queue the assembled tool calls, in index order.
    fn flush_tool_calls(&mut self) {
        let calls = std::mem::take(&mut self.tool_calls);
        if !calls.is_empty() {
            debug!(count = calls.len(), "Upstream requested tool calls");
        }
        for call in calls.into_values() {
            self.ready.push_back(call.finish());
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.flush_tool_calls();
    }
}

/// Decode an SSE byte stream into host stream parts.
///
/// Text deltas are yielded as they arrive. Tool calls are yielded after the
/// stream terminates. Cancelling `cancel` ends the stream with
/// [`HostError::Cancelled`].
pub fn decode_parts<S, E>(byte_stream: S, cancel: CancellationToken) -> PartStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + 'static,
{
    let state = DecodeState {
        stream: byte_stream.map(|r| r.map_err(|e| e.to_string())).boxed(),
        buf: BytesMut::new(),
        tool_calls: BTreeMap::new(),
        ready: VecDeque::new(),
        cancel,
        done: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.ready.pop_front() {
                if item.is_err() {
                    st.done = true;
                    st.ready.clear();
                }
                return Some((item, st));
            }

            if st.done {
                return None;
            }

            // A complete line in the buffer?
            if let Some(line_end) = st.buf.iter().position(|&b| b == b'\n') {
                let line = st.buf.split_to(line_end + 1);
                let line = String::from_utf8_lossy(&line).into_owned();
                if st.feed_line(&line) {
                    st.finish();
                }
                continue;
            }

            // Need more data from upstream.
            let cancel = st.cancel.clone();
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                next = st.stream.next() => Some(next),
            };
            let Some(next) = next else {
                st.done = true;
                return Some((Err(HostError::Cancelled), st));
            };

            match next {
                Some(Ok(chunk)) => st.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    warn!("Upstream stream error: {e}");
                    st.done = true;
                    return Some((Err(HostError::Stream(e)), st));
                }
                None => {
                    // Stream ended without [DONE]; a trailing unterminated line still counts.
                    if !st.buf.is_empty() {
                        let rest = st.buf.split();
                        st.feed_line(&String::from_utf8_lossy(&rest));
                    }
                    st.finish();
                }
            }
        }
    })
    .boxed()
}
