//! Classification of restic output lines
//!
//! restic writes one JSON object per line when run with `--json`. Each object
//! carries a `message_type` discriminator; the known kinds get a typed
//! variant of [`ResticMessage`] and everything else is kept as raw JSON so
//! that newer restic versions never lose events.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One classified line of output
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// A JSON value
    Message(ResticMessage),
    /// Anything that is not valid JSON
    Text(String),
}

/// Classify one line of raw output.
///
/// Never fails: text that does not decode as JSON comes back as
/// [`Line::Text`] with the original content.
pub fn classify(line: &str) -> Line {
    match serde_json::from_str::<Value>(line.trim()) {
        Ok(value) => Line::Message(ResticMessage::from_value(value)),
        Err(_) => Line::Text(line.to_string()),
    }
}

/// Parse collected stdout into its JSON events, in order, skipping text lines
pub fn parse_output(output: &str) -> Vec<ResticMessage> {
    output
        .lines()
        .filter_map(|line| match classify(line) {
            Line::Message(message) => Some(message),
            Line::Text(_) => None,
        })
        .collect()
}

/// A decoded restic event
#[derive(Debug, Clone, PartialEq)]
pub enum ResticMessage {
    /// `status`: periodic progress
    Status(StatusMessage),
    /// `summary`: terminal result of the command
    Summary(SummaryMessage),
    /// `verbose_status`: per-item progress at higher verbosity
    VerboseStatus(VerboseStatusMessage),
    /// `error`: a non-fatal error about a single item
    Error(ErrorMessage),
    /// `exit_error`: the fatal error restic exits with
    ExitError(ExitErrorMessage),
    /// A `message_type` this crate does not model, or a known one other
    /// than `summary` whose body did not have the expected shape
    Other {
        /// The discriminator value
        message_type: String,
        /// The decoded object
        raw: Value,
    },
    /// JSON without a `message_type`, such as the snapshot list
    Unstructured(Value),
}

impl ResticMessage {
    /// Classify an already decoded JSON value
    pub fn from_value(value: Value) -> Self {
        let Some(kind) = value
            .get("message_type")
            .and_then(Value::as_str)
            .map(str::to_owned)
        else {
            return ResticMessage::Unstructured(value);
        };

        let typed = match kind.as_str() {
            "status" => serde_json::from_value(value.clone()).map(ResticMessage::Status),
            "summary" => serde_json::from_value(value.clone()).map(ResticMessage::Summary),
            "verbose_status" => {
                serde_json::from_value(value.clone()).map(ResticMessage::VerboseStatus)
            }
            "error" => serde_json::from_value(value.clone()).map(ResticMessage::Error),
            "exit_error" => serde_json::from_value(value.clone()).map(ResticMessage::ExitError),
            _ => {
                return ResticMessage::Other {
                    message_type: kind,
                    raw: value,
                }
            }
        };

        typed.unwrap_or_else(|e| {
            tracing::warn!("Malformed {} message, keeping it raw: {}", kind, e);
            // A summary always reaches summary observers, typed or not
            if let (Value::Object(fields), "summary") = (&value, kind.as_str()) {
                return ResticMessage::Summary(SummaryMessage::untyped(fields.clone()));
            }
            ResticMessage::Other {
                message_type: kind,
                raw: value,
            }
        })
    }

    /// The `message_type` discriminator, if there is one
    pub fn message_type(&self) -> Option<&str> {
        match self {
            ResticMessage::Status(_) => Some("status"),
            ResticMessage::Summary(_) => Some("summary"),
            ResticMessage::VerboseStatus(_) => Some("verbose_status"),
            ResticMessage::Error(_) => Some("error"),
            ResticMessage::ExitError(_) => Some("exit_error"),
            ResticMessage::Other { message_type, .. } => Some(message_type),
            ResticMessage::Unstructured(_) => None,
        }
    }

    /// The summary, if this is one
    pub fn as_summary(&self) -> Option<&SummaryMessage> {
        match self {
            ResticMessage::Summary(summary) => Some(summary),
            _ => None,
        }
    }

    /// Re-encode as JSON
    pub fn to_value(&self) -> Value {
        let encoded = match self {
            ResticMessage::Status(m) => serde_json::to_value(m),
            ResticMessage::Summary(m) => serde_json::to_value(m),
            ResticMessage::VerboseStatus(m) => serde_json::to_value(m),
            ResticMessage::Error(m) => serde_json::to_value(m),
            ResticMessage::ExitError(m) => serde_json::to_value(m),
            ResticMessage::Other { raw, .. } | ResticMessage::Unstructured(raw) => {
                return raw.clone()
            }
        };
        // These types only hold JSON-representable fields
        encoded.unwrap_or(Value::Null)
    }
}

/// Progress report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Fraction of work done, in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_done: Option<f64>,
    /// Seconds since the operation started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_elapsed: Option<u64>,
    /// Estimated seconds until completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<u64>,
    /// Files expected in total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_files: Option<u64>,
    /// Files handled so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_done: Option<u64>,
    /// Bytes expected in total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
    /// Bytes handled so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_done: Option<u64>,
    /// Errors seen so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_count: Option<u64>,
    /// Files currently being processed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub current_files: Vec<String>,
    /// Every field not modelled above, `message_type` included
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Final statistics of a command.
///
/// Backup summaries fill the file and blob counters; other commands put
/// their own counters in [`SummaryMessage::extra`]. Counters written as
/// integral floats (`3.0`) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMessage {
    /// New files stored
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub files_new: Option<u64>,
    /// Changed files stored
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub files_changed: Option<u64>,
    /// Files that were unchanged
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub files_unmodified: Option<u64>,
    /// New directories
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub dirs_new: Option<u64>,
    /// Changed directories
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub dirs_changed: Option<u64>,
    /// Unchanged directories
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub dirs_unmodified: Option<u64>,
    /// Data blobs written
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub data_blobs: Option<u64>,
    /// Tree blobs written
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub tree_blobs: Option<u64>,
    /// Bytes added before packing
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub data_added: Option<u64>,
    /// Bytes added after packing
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub data_added_packed: Option<u64>,
    /// Files looked at
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub total_files_processed: Option<u64>,
    /// Bytes looked at
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub total_bytes_processed: Option<u64>,
    /// Wall-clock duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
    /// Start timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_start: Option<String>,
    /// End timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_end: Option<String>,
    /// Id of the snapshot that was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Every field not modelled above, `message_type` included
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SummaryMessage {
    /// A summary whose fields could not be typed, kept whole in `extra`
    pub fn untyped(fields: Map<String, Value>) -> Self {
        Self {
            extra: fields,
            ..Default::default()
        }
    }
}

/// Deserialize a non-negative counter, accepting integral floats
fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match &value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid counter {}", n))),
        other => Err(D::Error::custom(format!("invalid counter {}", other))),
    }
}

/// Per-item progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerboseStatusMessage {
    /// What happened to the item (`new`, `unchanged`, `modified`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// The item path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Seconds spent on the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Size of the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_size: Option<u64>,
    /// Every field not modelled above, `message_type` included
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An error about a single item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// The error object
    #[serde(default)]
    pub error: Value,
    /// The phase the error happened in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub during: Option<String>,
    /// The item that failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Every field not modelled above, `message_type` included
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The fatal error restic exits with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitErrorMessage {
    /// Exit code restic is about to return
    pub code: i32,
    /// Human readable message
    pub message: String,
    /// Every field not modelled above, `message_type` included
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_line() {
        let line = classify(r#"{"message_type":"summary","files_new":3}"#);
        let Line::Message(ResticMessage::Summary(summary)) = line else {
            panic!("expected a summary, got {:?}", line);
        };
        assert_eq!(summary.files_new, Some(3));
    }

    #[test]
    fn test_status_line() {
        let line = classify(r#"{"message_type":"status","percent_done":0.25,"files_done":4}"#);
        match line {
            Line::Message(ResticMessage::Status(status)) => {
                assert_eq!(status.percent_done, Some(0.25));
                assert_eq!(status.files_done, Some(4));
            }
            other => panic!("expected a status, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            classify("not json at all"),
            Line::Text("not json at all".to_string())
        );
    }

    #[test]
    fn test_json_without_message_type_is_kept() {
        assert_eq!(
            classify(r#"{"unrelated":1}"#),
            Line::Message(ResticMessage::Unstructured(json!({"unrelated": 1})))
        );
    }

    #[test]
    fn test_unknown_kind_is_other() {
        let line = classify(r#"{"message_type":"version","version":"0.17.3"}"#);
        let Line::Message(message) = line else {
            panic!("expected JSON");
        };
        assert_eq!(message.message_type(), Some("version"));
        assert!(matches!(message, ResticMessage::Other { .. }));
    }

    #[test]
    fn test_malformed_known_kind_degrades_to_other() {
        let line = classify(r#"{"message_type":"status","percent_done":"half"}"#);
        match line {
            Line::Message(ResticMessage::Other { message_type, raw }) => {
                assert_eq!(message_type, "status");
                assert_eq!(raw["percent_done"], "half");
            }
            other => panic!("expected Other, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_accepts_integral_float_counters() {
        let message = ResticMessage::from_value(json!({
            "message_type": "summary",
            "files_new": 3.0,
            "data_added": 4096
        }));
        let summary = message.as_summary().unwrap();
        assert_eq!(summary.files_new, Some(3));
        assert_eq!(summary.data_added, Some(4096));
    }

    #[test]
    fn test_malformed_summary_stays_a_summary() {
        let source = json!({"message_type": "summary", "files_new": 2.5, "dry_run": true});
        let message = ResticMessage::from_value(source.clone());
        let summary = message.as_summary().unwrap();
        assert_eq!(summary.files_new, None);
        assert_eq!(message.message_type(), Some("summary"));
        assert_eq!(message.to_value(), source);
    }

    #[test]
    fn test_summary_round_trips_to_source_json() {
        let source = json!({
            "message_type": "summary",
            "files_new": 3,
            "files_changed": 0,
            "total_duration": 1.5,
            "snapshot_id": "4f1b2c3d",
            "dry_run": false
        });
        let message = ResticMessage::from_value(source.clone());
        assert!(message.as_summary().is_some());
        assert_eq!(message.to_value(), source);
    }

    #[test]
    fn test_exit_error() {
        let line = classify(r#"{"message_type":"exit_error","code":10,"message":"Fatal: repository does not exist"}"#);
        match line {
            Line::Message(ResticMessage::ExitError(exit)) => {
                assert_eq!(exit.code, 10);
                assert!(exit.message.contains("does not exist"));
            }
            other => panic!("expected exit_error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_output_skips_text() {
        let output = "{\"message_type\":\"status\"}\nscanning...\n[{\"id\":\"abc\"}]\n";
        let messages = parse_output(output);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message_type(), Some("status"));
        assert!(matches!(messages[1], ResticMessage::Unstructured(Value::Array(_))));
    }
}
