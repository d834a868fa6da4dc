//! Response records and the writer that emits them as JSON lines.

use qa_ledger_core::ErrorKind;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::errors::{IngestError, ProcessError};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok(Value),
    Error(ErrorBody),
}

/// The result of one command, tagged with its input line.
///
/// Serializes as `{"line": 3, "ok": ...}` or
/// `{"line": 3, "error": {"kind": "not_found", "message": "..."}}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommandResponse {
    pub line: u64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl CommandResponse {
    pub fn from_result(line: u64, result: Result<Value, ProcessError>) -> Self {
        let outcome = match result {
            Ok(value) => Outcome::Ok(value),
            Err(e) => Outcome::Error(ErrorBody {
                kind: e.kind(),
                message: e.to_string(),
            }),
        };
        Self { line, outcome }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok(_))
    }
}

/// Writes every response received on `responses` to `out`, one JSON document per line.
pub async fn write_responses<W>(
    mut responses: mpsc::Receiver<CommandResponse>,
    mut out: W,
) -> Result<(), IngestError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = responses.recv().await {
        let mut line =
            serde_json::to_vec(&response).map_err(|e| IngestError::write(e.to_string()))?;
        line.push(b'\n');
        out.write_all(&line)
            .await
            .map_err(|e| IngestError::write(e.to_string()))?;
        out.flush().await.map_err(|e| IngestError::write(e.to_string()))?;
    }
    Ok(())
}
