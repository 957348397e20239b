//! Wire protocol for the collate worker.
//!
//! Requests and responses are newline-delimited JSON objects with camelCase
//! keys. A request carries two pre-tokenized documents plus optional message
//! overrides and tuning knobs; the response stream for one request is zero or
//! more `warning`/`chunk` messages followed by exactly one terminal `error`
//! or `success`.
//!
//! This crate owns the wire shapes, the default user-facing message texts,
//! and the mapping from [`EngineError`] values onto terminal responses. The
//! framing itself (line splitting, flushing, size limits) lives in the worker
//! binary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use collate_engine::{DiffToken, EngineError, EngineSettings, RunStats};

/// Fallback text when the request does not override `emptyTextMessage`
pub const DEFAULT_EMPTY_TEXT: &str = "One or both texts are empty.";

/// Fallback text when the request does not override `tooLargeMessage`
pub const DEFAULT_TOO_LARGE: &str = "Documents are too large to compare.";

/// Fallback text when the request does not override `tooDissimilarMessage`
pub const DEFAULT_TOO_DISSIMILAR: &str =
    "These documents appear highly dissimilar. Comparison was stopped to save time.";

/// Protocol-level failures: a line that is not a valid request, or a frame
/// past the worker's size limit
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request line exceeds {limit} bytes")]
    OversizedFrame { limit: usize },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Any request the worker accepts. Tagged by `type`; unknown tags fail to
/// decode and are answered per the worker's malformed-line policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerRequest {
    Compare(CompareRequest),
}

/// One comparison job.
///
/// Absent token arrays decode as empty and are rejected exactly like
/// explicitly empty ones. `warnings` and `settings` are optional wholesale
/// and field-by-field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    /// Base document tokens
    #[serde(default)]
    pub base_tokens: Vec<String>,

    /// Comparison document tokens
    #[serde(default)]
    pub comparison_tokens: Vec<String>,

    /// Caller-supplied message text overrides
    #[serde(default)]
    pub warnings: WarningMessages,

    /// Tuning overrides, merged per-field against the defaults
    #[serde(default)]
    pub settings: EngineSettings,
}

/// Per-request overrides for the user-facing message texts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_text_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub too_large_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub too_dissimilar_message: Option<String>,
}

impl WarningMessages {
    /// Text for the `EMPTY_TEXT` error
    #[must_use]
    pub fn empty_text(&self) -> &str {
        self.empty_text_message
            .as_deref()
            .unwrap_or(DEFAULT_EMPTY_TEXT)
    }

    /// Text for the oversized-input warning
    #[must_use]
    pub fn too_large(&self) -> &str {
        self.too_large_message.as_deref().unwrap_or(DEFAULT_TOO_LARGE)
    }

    /// Text for the high-complexity warning. There is no default: `None`
    /// means the warning is suppressed on the wire.
    #[must_use]
    pub fn complex(&self) -> Option<&str> {
        self.complex_message.as_deref()
    }

    /// Text for the `TOO_DISSIMILAR` error
    #[must_use]
    pub fn too_dissimilar(&self) -> &str {
        self.too_dissimilar_message
            .as_deref()
            .unwrap_or(DEFAULT_TOO_DISSIMILAR)
    }
}

/// Wire classification of a terminal error. Unclassified fatal errors carry
/// no code at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EmptyText,
    TooDissimilar,
}

/// Wire form of the success statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessStats {
    pub base_word_count: usize,
    pub comparison_word_count: usize,
    pub duration_ms: u64,
}

impl From<&RunStats> for SuccessStats {
    fn from(stats: &RunStats) -> Self {
        Self {
            base_word_count: stats.base_word_count,
            comparison_word_count: stats.comparison_word_count,
            duration_ms: stats.duration_ms,
        }
    }
}

/// One message on the response stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerResponse {
    /// Advisory; never terminal
    Warning { message: String },

    /// A committed slice of the diff, in document order
    Chunk { tokens: Vec<DiffToken> },

    /// Terminal failure. `code` is omitted entirely for unclassified errors.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<ErrorCode>,
    },

    /// Terminal completion
    Success { stats: SuccessStats },
}

impl WorkerResponse {
    /// Advisory warning message
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Chunk of committed diff tokens
    #[must_use]
    pub fn chunk(tokens: Vec<DiffToken>) -> Self {
        Self::Chunk { tokens }
    }

    /// Terminal error with an optional wire code
    pub fn error(message: impl Into<String>, code: Option<ErrorCode>) -> Self {
        Self::Error {
            message: message.into(),
            code,
        }
    }

    /// Terminal success from the engine's run stats
    #[must_use]
    pub fn success(stats: &RunStats) -> Self {
        Self::Success {
            stats: SuccessStats::from(stats),
        }
    }

    /// Whether this message ends a request's response stream
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Success { .. })
    }
}

/// Map a terminal engine error onto its wire response, resolving the message
/// text against the request's overrides.
///
/// Early-stop outcomes keep their codes; validation and cancellation failures
/// go out uncoded. `Io` errors should not reach this function (the worker
/// propagates them instead of answering), but mapping one is still safe.
#[must_use]
pub fn error_response(error: &EngineError, messages: &WarningMessages) -> WorkerResponse {
    match error {
        EngineError::EmptyInput => {
            WorkerResponse::error(messages.empty_text(), Some(ErrorCode::EmptyText))
        }
        EngineError::TooDissimilar(_) => {
            WorkerResponse::error(messages.too_dissimilar(), Some(ErrorCode::TooDissimilar))
        }
        other => WorkerResponse::error(other.to_string(), None),
    }
}

/// Decode one request line
pub fn decode_request(line: &str) -> Result<WorkerRequest> {
    Ok(serde_json::from_str(line)?)
}

/// Encode one response as a single JSON line (no trailing newline)
pub fn encode_response(response: &WorkerResponse) -> Result<String> {
    Ok(serde_json::to_string(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use collate_engine::DissimilarityReason;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_decodes_camel_case_fields() {
        let line = r#"{
            "type": "compare",
            "baseTokens": ["a", "b"],
            "comparisonTokens": ["a", "c"],
            "warnings": { "tooDissimilarMessage": "nope" },
            "settings": { "batchSize": 32 }
        }"#;

        let WorkerRequest::Compare(request) = decode_request(line).unwrap();
        assert_eq!(request.base_tokens, vec!["a", "b"]);
        assert_eq!(request.comparison_tokens, vec!["a", "c"]);
        assert_eq!(request.warnings.too_dissimilar(), "nope");
        assert_eq!(request.settings.batch_size, 32);
        // Untouched knobs keep their defaults
        assert_eq!(request.settings.complex_threshold, 25_000);
    }

    #[test]
    fn test_request_minimal_form_decodes_to_defaults() {
        let WorkerRequest::Compare(request) =
            decode_request(r#"{ "type": "compare" }"#).unwrap();
        assert!(request.base_tokens.is_empty());
        assert!(request.comparison_tokens.is_empty());
        assert_eq!(request.warnings, WarningMessages::default());
        assert_eq!(request.settings, EngineSettings::default());
    }

    #[test]
    fn test_unknown_request_tag_fails_decode() {
        assert!(decode_request(r#"{ "type": "shutdown" }"#).is_err());
        assert!(decode_request("not json at all").is_err());
    }

    #[test]
    fn test_message_defaults_and_overrides() {
        let defaults = WarningMessages::default();
        assert_eq!(defaults.empty_text(), DEFAULT_EMPTY_TEXT);
        assert_eq!(defaults.too_large(), DEFAULT_TOO_LARGE);
        assert_eq!(defaults.too_dissimilar(), DEFAULT_TOO_DISSIMILAR);
        assert_eq!(defaults.complex(), None);

        let custom = WarningMessages {
            empty_text_message: Some("custom empty".to_string()),
            complex_message: Some("custom complex".to_string()),
            ..WarningMessages::default()
        };
        assert_eq!(custom.empty_text(), "custom empty");
        assert_eq!(custom.complex(), Some("custom complex"));
        assert_eq!(custom.too_large(), DEFAULT_TOO_LARGE);
    }

    #[test]
    fn test_warning_wire_shape() {
        let response = WorkerResponse::warning("heads up");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "type": "warning", "message": "heads up" }));
    }

    #[test]
    fn test_chunk_wire_shape() {
        let response = WorkerResponse::chunk(vec![
            DiffToken::unchanged("the"),
            DiffToken::removed("cat"),
            DiffToken::added("dog"),
        ]);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "chunk",
                "tokens": [
                    { "type": "unchanged", "text": "the" },
                    { "type": "removed", "text": "cat" },
                    { "type": "added", "text": "dog" }
                ]
            })
        );
    }

    #[test]
    fn test_error_wire_shape_with_code() {
        let response = WorkerResponse::error("empty", Some(ErrorCode::EmptyText));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({ "type": "error", "message": "empty", "code": "EMPTY_TEXT" })
        );
    }

    #[test]
    fn test_uncoded_error_omits_the_code_key() {
        let response = WorkerResponse::error("boom", None);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "type": "error", "message": "boom" }));
    }

    #[test]
    fn test_success_wire_shape() {
        let stats = RunStats {
            base_word_count: 10,
            comparison_word_count: 12,
            duration_ms: 34,
            chunks_emitted: 2,
            peak_window: 512,
        };
        let value = serde_json::to_value(WorkerResponse::success(&stats)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "success",
                "stats": {
                    "baseWordCount": 10,
                    "comparisonWordCount": 12,
                    "durationMs": 34
                }
            })
        );
    }

    #[test]
    fn test_terminal_classification() {
        assert!(!WorkerResponse::warning("w").is_terminal());
        assert!(!WorkerResponse::chunk(Vec::new()).is_terminal());
        assert!(WorkerResponse::error("e", None).is_terminal());
        assert!(WorkerResponse::success(&RunStats::default()).is_terminal());
    }

    #[test]
    fn test_engine_error_mapping() {
        let messages = WarningMessages {
            too_dissimilar_message: Some("too far apart".to_string()),
            ..WarningMessages::default()
        };

        let empty = error_response(&EngineError::EmptyInput, &messages);
        assert_eq!(
            empty,
            WorkerResponse::error(DEFAULT_EMPTY_TEXT, Some(ErrorCode::EmptyText))
        );

        let dissimilar = error_response(
            &EngineError::TooDissimilar(DissimilarityReason::Prefilter {
                unigram: 0.0,
                bigram: 0.0,
            }),
            &messages,
        );
        assert_eq!(
            dissimilar,
            WorkerResponse::error("too far apart", Some(ErrorCode::TooDissimilar))
        );

        let invalid = error_response(
            &EngineError::invalid_settings("batch_size must be > 0"),
            &messages,
        );
        match invalid {
            WorkerResponse::Error { code: None, message } => {
                assert!(message.contains("batch_size"));
            }
            other => panic!("expected uncoded error, got {other:?}"),
        }

        let cancelled = error_response(&EngineError::Cancelled, &messages);
        assert!(matches!(
            cancelled,
            WorkerResponse::Error { code: None, .. }
        ));
    }

    #[test]
    fn test_responses_round_trip_through_json() {
        let responses = vec![
            WorkerResponse::warning("w"),
            WorkerResponse::chunk(vec![DiffToken::added("x")]),
            WorkerResponse::error("e", Some(ErrorCode::TooDissimilar)),
            WorkerResponse::error("e", None),
            WorkerResponse::success(&RunStats::default()),
        ];
        for response in responses {
            let line = encode_response(&response).unwrap();
            let decoded: WorkerResponse = serde_json::from_str(&line).unwrap();
            assert_eq!(decoded, response);
        }
    }
}
