//! Message types for the consumer.

use crate::processor::Command;

/// Messages sent from a consumer to the orchestrator.
#[derive(Debug, Clone)]
pub enum StreamMessage {
    /// A decoded command and its 1-based line number.
    Command { line: u64, command: Command },
    /// A line that could not be decoded.
    Malformed { line: u64, error: String },
    /// The source has no more lines.
    End,
}

impl StreamMessage {
    /// Decodes one line of input. Returns `None` for blank lines.
    pub fn decode(line: u64, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match serde_json::from_str::<Command>(raw) {
            Ok(command) => StreamMessage::Command { line, command },
            Err(e) => StreamMessage::Malformed {
                line,
                error: e.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_blank_and_malformed() {
        assert!(StreamMessage::decode(1, "   ").is_none());
        assert!(matches!(
            StreamMessage::decode(2, "{not json"),
            Some(StreamMessage::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            StreamMessage::decode(3, r#"{"op":"get_user","user_id":"8c1d6c4e-55e4-4b4e-9a55-3c5a7d3b1c11"}"#),
            Some(StreamMessage::Command { line: 3, .. })
        ));
    }
}
