use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

use crate::{AnalysisError, ClassifiedComment, EngagementTier, Intent, Sentiment, ToxicityCategory};

/// A comment as it arrives from the classification service, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "sentiment", alias = "label")]
    pub sentiment_label: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default, alias = "toxicity")]
    pub toxicity_categories: Option<Vec<String>>,
    #[serde(default, alias = "engagement")]
    pub engagement_tier: Option<String>,
}

impl CommentRecord {
    /// Decodes one element of a JSON comment array. A malformed element becomes an
    /// `InvalidComment` for its position instead of failing the surrounding array.
    pub fn from_value(value: Value, position: usize) -> Result<Self, AnalysisError> {
        let id = match value.get("id") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            _ => None,
        };
        serde_json::from_value(value).map_err(|err| {
            AnalysisError::invalid(position, id.as_deref(), format!("malformed record: {}", err))
        })
    }

    pub fn into_comment(self, position: usize) -> Result<ClassifiedComment, AnalysisError> {
        let id = self.id.as_deref();

        let sentiment = match self.sentiment_label.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(AnalysisError::invalid(position, id, "missing sentiment label"))
            }
            Some(label) => Sentiment::parse_label(label).ok_or_else(|| {
                AnalysisError::invalid(position, id, format!("unknown sentiment label: {}", label))
            })?,
        };

        let confidence = self
            .confidence
            .ok_or_else(|| AnalysisError::invalid(position, id, "missing confidence"))?;

        let intent = parse_optional(self.intent.as_deref(), Intent::parse_label).map_err(|label| {
            AnalysisError::invalid(position, id, format!("unknown intent: {}", label))
        })?;

        let engagement_tier =
            parse_optional(self.engagement_tier.as_deref(), EngagementTier::parse_label)
                .map_err(|label| {
                    let reason = format!("unknown engagement tier: {}", label);
                    AnalysisError::invalid(position, id, reason)
                })?;

        let mut toxicity_categories = BTreeSet::new();
        for label in self.toxicity_categories.iter().flatten() {
            let category = ToxicityCategory::parse_label(label).ok_or_else(|| {
                AnalysisError::invalid(position, id, format!("unknown toxicity category: {}", label))
            })?;
            toxicity_categories.insert(category);
        }

        let comment = ClassifiedComment {
            id: self
                .id
                .clone()
                .unwrap_or_else(|| derive_comment_id(position, &self.text)),
            text: self.text,
            sentiment_label: sentiment,
            confidence,
            intent,
            toxicity_categories,
            engagement_tier,
        };
        check_comment(&comment, position)?;
        Ok(comment)
    }
}

/// Validated, ordered comments for one analysis request. Position in `comments` is arrival order.
#[derive(Debug, Clone, Default)]
pub struct AnalysisBatch {
    comments: Vec<ClassifiedComment>,
    skipped: Vec<AnalysisError>,
}

impl AnalysisBatch {
    pub fn from_records(records: Vec<CommentRecord>) -> Self {
        Self::collect(
            records
                .into_iter()
                .enumerate()
                .map(|(position, record)| (position, record.into_comment(position))),
        )
    }

    /// Builds a batch from raw JSON elements, decoding each one on its own.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::collect(values.into_iter().enumerate().map(|(position, value)| {
            let comment = CommentRecord::from_value(value, position)
                .and_then(|record| record.into_comment(position));
            (position, comment)
        }))
    }

    pub fn from_comments(comments: Vec<ClassifiedComment>) -> Self {
        Self::collect(comments.into_iter().enumerate().map(|(position, comment)| {
            let checked = check_comment(&comment, position).map(|()| comment);
            (position, checked)
        }))
    }

    /// Only a payload that is not a JSON array fails; bad elements are skipped.
    pub fn from_json(payload: &str) -> Result<Self, String> {
        let values: Vec<Value> = serde_json::from_str(payload)
            .map_err(|err| format!("failed to parse comments: {}", err))?;
        Ok(Self::from_values(values))
    }

    pub fn comments(&self) -> &[ClassifiedComment] {
        &self.comments
    }

    pub fn skipped(&self) -> &[AnalysisError] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    fn collect(
        results: impl IntoIterator<Item = (usize, Result<ClassifiedComment, AnalysisError>)>,
    ) -> Self {
        let mut batch = Self::default();
        let mut seen = HashSet::new();
        for (position, result) in results {
            match result {
                Ok(comment) => batch.admit(comment, position, &mut seen),
                Err(err) => batch.skip(err),
            }
        }
        batch
    }

    fn admit(&mut self, comment: ClassifiedComment, position: usize, seen: &mut HashSet<String>) {
        if !seen.insert(comment.id.clone()) {
            let err = AnalysisError::invalid(position, Some(&comment.id), "duplicate id");
            self.skip(err);
            return;
        }
        self.comments.push(comment);
    }

    fn skip(&mut self, err: AnalysisError) {
        warn!(error = %err, "skipping comment record");
        self.skipped.push(err);
    }
}

fn check_comment(comment: &ClassifiedComment, position: usize) -> Result<(), AnalysisError> {
    let id = Some(comment.id.as_str());
    if comment.text.trim().is_empty() {
        return Err(AnalysisError::invalid(position, id, "empty text"));
    }
    if !(0.0..=1.0).contains(&comment.confidence) {
        return Err(AnalysisError::invalid(
            position,
            id,
            format!("confidence out of range: {}", comment.confidence),
        ));
    }
    Ok(())
}

fn parse_optional<T>(
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => parse(label).map(Some).ok_or_else(|| label.to_string()),
    }
}

fn derive_comment_id(position: usize, text: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(position.to_le_bytes());
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    format!("comment_{:x}", u64::from_be_bytes(bytes))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

pub(crate) fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> CommentRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_upstream_uppercase_labels() {
        let comment = record(
            r#"{"id": 7, "text": "Great video", "sentiment": "POSITIVE", "confidence": 0.98}"#,
        )
        .into_comment(0)
        .unwrap();
        assert_eq!(comment.id, "7");
        assert_eq!(comment.sentiment_label, Sentiment::Positive);
        assert!(comment.is_safe());
    }

    #[test]
    fn accepts_legacy_category_keys() {
        let comment = record(
            r#"{"id": "c1", "text": "hot take", "sentimentLabel": "neutral", "confidence": 0.5,
                "intent": "complaints", "engagementTier": "hries",
                "toxicityCategories": ["identity_attack", "profanity", "profanity"]}"#,
        )
        .into_comment(0)
        .unwrap();
        assert_eq!(comment.intent, Some(Intent::Complaint));
        assert_eq!(comment.engagement_tier, Some(EngagementTier::Debate));
        assert_eq!(comment.toxicity_categories.len(), 2);
    }

    #[test]
    fn rejects_missing_sentiment() {
        let err = record(r#"{"id": "c1", "text": "hello", "confidence": 0.5}"#)
            .into_comment(3)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidComment { position: 3, .. }));
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let err = record(r#"{"text": "hello", "sentimentLabel": "positive", "confidence": 1.2}"#)
            .into_comment(0)
            .unwrap_err();
        assert!(err.to_string().contains("confidence out of range"));
    }

    fn reason(err: AnalysisError) -> String {
        match err {
            AnalysisError::InvalidComment { reason, .. } => reason,
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn rejects_unknown_labels_on_every_axis() {
        let cases = [
            (r#""sentimentLabel": "angry""#, "unknown sentiment label: angry"),
            (r#""sentimentLabel": "positive", "intent": "rant""#, "unknown intent: rant"),
            (
                r#""sentimentLabel": "positive", "engagementTier": "lurker""#,
                "unknown engagement tier: lurker",
            ),
            (
                r#""sentimentLabel": "positive", "toxicityCategories": ["insult", "spam"]"#,
                "unknown toxicity category: spam",
            ),
        ];
        for (fields, expected) in cases {
            let json = format!(r#"{{"id": "c1", "text": "hello", "confidence": 0.5, {}}}"#, fields);
            let err = record(&json).into_comment(2).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidComment { position: 2, .. }));
            assert_eq!(reason(err), expected);
        }
    }

    #[test]
    fn rejects_missing_confidence() {
        let err = record(r#"{"id": "c1", "text": "hello", "sentimentLabel": "negative"}"#)
            .into_comment(0)
            .unwrap_err();
        assert_eq!(reason(err), "missing confidence");
    }

    #[test]
    fn malformed_element_keeps_its_position_and_id() {
        let value = serde_json::json!({
            "id": 9,
            "text": null,
            "sentimentLabel": "positive",
            "confidence": 0.4
        });
        let err = CommentRecord::from_value(value, 5).unwrap_err();
        match err {
            AnalysisError::InvalidComment { position, id, reason } => {
                assert_eq!(position, 5);
                assert_eq!(id.as_deref(), Some("9"));
                assert!(reason.starts_with("malformed record"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn derived_ids_are_stable() {
        let first = derive_comment_id(4, "same text");
        let second = derive_comment_id(4, "same text");
        assert_eq!(first, second);
        assert_ne!(first, derive_comment_id(5, "same text"));
        assert!(first.starts_with("comment_"));
    }
}
