//! Reduces the analysis SSE stream to a single payload.
//!
//! The reducer is fed raw byte chunks as they arrive. Bytes are buffered
//! until a full line is available, so frames and multi-byte characters may
//! be split across chunks freely. Once a terminal state is reached further
//! input is ignored.

use serde_json::{Map, Value};

use crate::types::StreamProgressEvent;

const ANALYSIS_KEYS: [&str; 2] = ["enhanced_analysis", "keyword_analysis"];

/// Why the stream could not produce a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The stream ended without a recoverable payload.
    NoPayload,
    /// A `data:` line did not decode as JSON.
    MalformedFrame(String),
    /// The stream request failed or the connection dropped.
    Transport(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPayload => f.write_str("stream ended without a result"),
            Self::MalformedFrame(e) => write!(f, "malformed stream frame: {e}"),
            Self::Transport(e) => write!(f, "stream transport failure: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReducerState {
    Idle,
    Streaming,
    Resolved(Value),
    FallbackRequested(FallbackReason),
    Failed(String),
}

impl ReducerState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Resolved(_) | Self::FallbackRequested(_) | Self::Failed(_)
        )
    }
}

#[derive(Debug)]
pub struct ProgressReducer {
    buffer: Vec<u8>,
    state: ReducerState,
    frames_seen: usize,
    last_progress: Option<f64>,
    /// `data.result` of the last `completed`-stage frame.
    completed_candidate: Option<Value>,
    /// Payload of the last progress frame carrying a recognized key.
    progress_candidate: Option<Value>,
}

impl Default for ProgressReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReducer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: ReducerState::Idle,
            frames_seen: 0,
            last_progress: None,
            completed_candidate: None,
            progress_candidate: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ReducerState {
        &self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of JSON frames inspected so far.
    #[must_use]
    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    #[must_use]
    pub fn last_progress(&self) -> Option<f64> {
        self.last_progress
    }

    /// Feed one chunk of the response body. Returns the frames decoded from
    /// it, in order, up to and including the one that ended the stream.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<StreamProgressEvent> {
        let mut events = Vec::new();
        if self.is_terminal() {
            return events;
        }
        self.state = ReducerState::Streaming;
        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = self.handle_line(&line) {
                events.push(event);
            }
            if self.is_terminal() {
                self.buffer.clear();
                break;
            }
        }
        events
    }

    /// Record a transport failure. Has no effect once terminal.
    pub fn abort(&mut self, reason: impl Into<String>) {
        if !self.is_terminal() {
            self.state = ReducerState::FallbackRequested(FallbackReason::Transport(reason.into()));
        }
    }

    /// Close the stream: process any unterminated last line, then try to
    /// salvage a payload if progress reached 100.
    #[must_use]
    pub fn finish(mut self) -> ReducerState {
        if !self.is_terminal() && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.handle_line(&line);
        }
        if self.is_terminal() {
            return self.state;
        }

        if self.last_progress.is_some_and(|p| p >= 100.0) {
            let salvaged = self
                .completed_candidate
                .take()
                .and_then(salvage)
                .or_else(|| self.progress_candidate.take().and_then(salvage));
            if let Some(payload) = salvaged {
                tracing::debug!("recovered analysis payload after stream close");
                return ReducerState::Resolved(payload);
            }
        }
        ReducerState::FallbackRequested(FallbackReason::NoPayload)
    }

    fn handle_line(&mut self, raw: &[u8]) -> Option<StreamProgressEvent> {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line.trim_end_matches(['\n', '\r']),
            Err(e) => {
                self.state = ReducerState::FallbackRequested(FallbackReason::MalformedFrame(
                    e.to_string(),
                ));
                return None;
            }
        };

        let payload = line.strip_prefix("data:")?.trim();
        if payload.is_empty() || payload == "[DONE]" {
            return None;
        }

        let frame: Value = match serde_json::from_str(payload) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable stream frame");
                self.state =
                    ReducerState::FallbackRequested(FallbackReason::MalformedFrame(e.to_string()));
                return None;
            }
        };

        self.frames_seen += 1;
        let event = StreamProgressEvent::from_value(&frame);
        if event.progress.is_some() {
            self.last_progress = event.progress;
        }
        self.inspect(&frame, &event);
        Some(event)
    }

    fn inspect(&mut self, frame: &Value, event: &StreamProgressEvent) {
        match event.kind.as_deref() {
            None | Some("progress") => {
                if let Some(payload) = event.data.as_ref().and_then(nested_payload) {
                    self.state = ReducerState::Resolved(payload);
                    return;
                }
                self.remember_candidates(event);
            }
            Some("result" | "complete") => {
                let payload = event
                    .data
                    .as_ref()
                    .and_then(|d| d.get("result"))
                    .and_then(as_object_value)
                    .filter(carries_analysis)
                    .or_else(|| {
                        event
                            .data
                            .as_ref()
                            .and_then(as_object_value)
                            .filter(carries_analysis)
                    })
                    .or_else(|| {
                        event
                            .result
                            .as_ref()
                            .and_then(as_object_value)
                            .filter(carries_analysis)
                    })
                    .or_else(|| Some(frame.clone()).filter(carries_analysis));
                self.state = match payload {
                    Some(payload) => ReducerState::Resolved(payload),
                    None => {
                        tracing::warn!("completion frame carried no analysis map");
                        ReducerState::FallbackRequested(FallbackReason::NoPayload)
                    }
                };
            }
            Some("error") => {
                self.state = ReducerState::Failed(event.error_message());
            }
            // `end` may arrive after the payload frame and never carries the
            // result itself.
            Some(_) => {}
        }
    }

    fn remember_candidates(&mut self, event: &StreamProgressEvent) {
        let Some(data) = event.data.as_ref() else {
            return;
        };
        if let Some(result) = data.get("result").filter(|r| !r.is_null()) {
            if event.stage.as_deref() == Some("completed") {
                self.completed_candidate = Some(result.clone());
            }
            self.progress_candidate = Some(result.clone());
        } else if ANALYSIS_KEYS.iter().any(|k| data.get(*k).is_some()) {
            self.progress_candidate = Some(data.clone());
        }
    }
}

/// `data.result` as an object, or `data` itself when it carries an analysis map.
fn nested_payload(data: &Value) -> Option<Value> {
    if let Some(result) = data.get("result").filter(|r| r.is_object()) {
        return Some(result.clone());
    }
    ANALYSIS_KEYS
        .iter()
        .any(|k| data.get(*k).is_some_and(Value::is_object))
        .then(|| data.clone())
}

fn carries_analysis(value: &Value) -> bool {
    ANALYSIS_KEYS.iter().any(|k| value.get(*k).is_some_and(|v| !v.is_null()))
}

fn as_object_value(value: &Value) -> Option<Value> {
    match value {
        Value::Object(_) => Some(value.clone()),
        Value::String(s) => serde_json::from_str::<Value>(s)
            .ok()
            .filter(Value::is_object),
        _ => None,
    }
}

/// Accept an object or a JSON string encoding one; analysis maps that were
/// themselves sent as strings are decoded in place.
fn salvage(candidate: Value) -> Option<Value> {
    let Value::Object(mut obj) = as_object_value(&candidate)? else {
        return None;
    };
    for key in ANALYSIS_KEYS {
        if let Some(Value::String(inner)) = obj.get(key) {
            match serde_json::from_str::<Map<String, Value>>(inner) {
                Ok(map) => {
                    obj.insert(key.to_string(), Value::Object(map));
                }
                Err(_) => {
                    obj.remove(key);
                }
            }
        }
    }
    Some(Value::Object(obj))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn frame(value: &Value) -> Vec<u8> {
        format!("data: {value}\n\n").into_bytes()
    }

    #[test]
    fn resolves_on_nested_result_and_ignores_later_frames() {
        let mut body = frame(&json!({"stage": "analyzing", "progress": 40}));
        body.extend(frame(&json!({
            "stage": "completed",
            "progress": 100,
            "data": {"result": {"enhanced_analysis": {"x": {}}}}
        })));
        body.extend(frame(&json!({"type": "end", "stage": "completed"})));

        let mut reducer = ProgressReducer::new();
        let events = reducer.push_chunk(&body);

        assert_eq!(events.len(), 2);
        assert_eq!(reducer.frames_seen(), 2);
        assert_eq!(
            reducer.finish(),
            ReducerState::Resolved(json!({"enhanced_analysis": {"x": {}}}))
        );
    }

    #[test]
    fn frames_split_across_chunks_are_reassembled() {
        let body = frame(&json!({"type": "result", "data": {"keyword_analysis": {"a b": {}}}}));
        let (head, tail) = body.split_at(17);

        let mut reducer = ProgressReducer::new();
        assert!(reducer.push_chunk(head).is_empty());
        assert_eq!(reducer.state(), &ReducerState::Streaming);
        assert_eq!(reducer.push_chunk(tail).len(), 1);
        assert!(matches!(reducer.state(), ReducerState::Resolved(_)));
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let body = frame(&json!({"stage": "análisis", "progress": 10}));
        let split = body
            .windows(2)
            .position(|w| w == "á".as_bytes())
            .unwrap()
            + 1;

        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(&body[..split]);
        let events = reducer.push_chunk(&body[split..]);

        assert_eq!(events[0].stage.as_deref(), Some("análisis"));
        assert_eq!(reducer.last_progress(), Some(10.0));
    }

    #[test]
    fn error_frame_fails() {
        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(&frame(&json!({"type": "error", "message": "quota exceeded"})));
        assert_eq!(reducer.finish(), ReducerState::Failed("quota exceeded".into()));
    }

    #[test]
    fn malformed_line_requests_fallback() {
        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(b"data: {not json\n");
        assert!(matches!(
            reducer.finish(),
            ReducerState::FallbackRequested(FallbackReason::MalformedFrame(_))
        ));
    }

    #[test]
    fn comments_and_other_fields_are_skipped() {
        let mut reducer = ProgressReducer::new();
        let events = reducer.push_chunk(b": keep-alive\nevent: progress\nid: 4\ndata: [DONE]\n\n");
        assert!(events.is_empty());
        assert_eq!(reducer.frames_seen(), 0);
    }

    #[test]
    fn completed_string_payload_is_salvaged_at_close() {
        let payload = json!({"enhanced_analysis": {"pet grooming": {"search_volume": 10}}});
        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(&frame(&json!({
            "stage": "completed",
            "progress": 100,
            "data": {"result": payload.to_string()}
        })));
        reducer.push_chunk(&frame(&json!({"type": "end"})));

        assert_eq!(reducer.finish(), ReducerState::Resolved(payload));
    }

    #[test]
    fn stringified_analysis_map_is_decoded() {
        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(&frame(&json!({
            "progress": 100,
            "data": {"enhanced_analysis": "{\"a b\": {}}"}
        })));
        assert_eq!(
            reducer.finish(),
            ReducerState::Resolved(json!({"enhanced_analysis": {"a b": {}}}))
        );
    }

    #[test]
    fn no_payload_requests_fallback() {
        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(&frame(&json!({"stage": "analyzing", "progress": 60})));
        reducer.push_chunk(&frame(&json!({"type": "end"})));
        assert_eq!(
            reducer.finish(),
            ReducerState::FallbackRequested(FallbackReason::NoPayload)
        );
    }

    #[test]
    fn unterminated_last_line_is_processed_on_finish() {
        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(br#"data: {"type":"complete","result":{"keyword_analysis":{}}}"#);
        assert_eq!(reducer.frames_seen(), 0);
        assert_eq!(
            reducer.finish(),
            ReducerState::Resolved(json!({"keyword_analysis": {}}))
        );
    }

    #[test]
    fn completion_without_analysis_map_requests_fallback() {
        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(&frame(&json!({"type": "complete", "data": {"status": "done"}})));
        assert_eq!(
            reducer.finish(),
            ReducerState::FallbackRequested(FallbackReason::NoPayload)
        );
    }

    #[test]
    fn input_after_resolution_is_ignored() {
        let mut reducer = ProgressReducer::new();
        reducer.push_chunk(&frame(&json!({"type": "result", "data": {"keyword_analysis": {}}})));
        let later = reducer.push_chunk(&frame(&json!({"type": "error", "message": "late"})));
        assert!(later.is_empty());
        assert!(matches!(reducer.finish(), ReducerState::Resolved(_)));
    }
}
