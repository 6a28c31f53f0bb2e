use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnalysisError {
    /// A record that cannot take part in aggregation. Skipped and counted, never fatal to the batch.
    #[error("invalid comment at position {position}: {reason}")]
    #[serde(rename_all = "camelCase")]
    InvalidComment {
        position: usize,
        id: Option<String>,
        reason: String,
    },
    #[error("unknown tier: {tier} (expected free or pro)")]
    UnknownTier { tier: String },
}

impl AnalysisError {
    pub(crate) fn invalid(position: usize, id: Option<&str>, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidComment {
            position,
            id: id.map(str::to_string),
            reason: reason.into(),
        }
    }
}
