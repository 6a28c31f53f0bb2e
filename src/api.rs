use comment_pulse::{
    AnalysisBatch, AnalysisConfig, AnalysisError, AnalysisReport, ClassifiedComment, Distributions,
    ReplyCandidate, Tier,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAnalyzeRequest {
    pub request_id: Option<String>,
    /// Kept as raw JSON so one malformed record is skipped rather than failing the request.
    #[serde(default)]
    pub comments: Vec<Value>,
    pub top_n: Option<usize>,
}

impl ApiAnalyzeRequest {
    /// Splits the request into the batch to analyze and the config to analyze it with.
    pub fn into_parts(self, base: &AnalysisConfig) -> (AnalysisBatch, AnalysisConfig) {
        let mut config = base.clone();
        if let Some(top_n) = self.top_n {
            config.ranking.top_n = top_n;
        }
        (AnalysisBatch::from_values(self.comments), config)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAnalyzeResponse {
    pub request_id: String,
    pub total_count: usize,
    pub skipped_count: usize,
    pub skipped: Vec<AnalysisError>,
    pub distributions: Distributions,
    pub top_positive: Vec<ClassifiedComment>,
    pub top_negative: Vec<ClassifiedComment>,
    pub summary_short: String,
    pub summary_detailed: String,
}

impl ApiAnalyzeResponse {
    pub fn from_report(report: AnalysisReport<'_>, request_id: String) -> Self {
        Self {
            request_id,
            total_count: report.total_count,
            skipped_count: report.skipped_count,
            skipped: report.skipped.to_vec(),
            distributions: report.distributions,
            top_positive: report.top_positive.into_iter().cloned().collect(),
            top_negative: report.top_negative.into_iter().cloned().collect(),
            summary_short: report.summary_short,
            summary_detailed: report.summary_detailed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGateRequest {
    #[serde(default)]
    pub candidates: Vec<ReplyCandidate>,
    pub tier: Option<String>,
    pub free_limit: Option<usize>,
}

impl ApiGateRequest {
    pub fn resolve(&self, config: &AnalysisConfig) -> Result<(Tier, usize), String> {
        let tier = match self.tier.as_deref() {
            Some(label) => label.parse::<Tier>(),
            None => config.default_tier(),
        }
        .map_err(|err| err.to_string())?;
        let free_limit = self.free_limit.unwrap_or(config.entitlement.free_limit);
        Ok((tier, free_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_request_overrides_top_n() {
        let request: ApiAnalyzeRequest = serde_json::from_str(
            r#"{"comments": [{"id": 1, "text": "Clear and helpful", "sentimentLabel": "positive", "confidence": 0.9}], "topN": 1}"#,
        )
        .unwrap();
        let (batch, config) = request.into_parts(&AnalysisConfig::default());
        assert_eq!(batch.len(), 1);
        assert_eq!(config.ranking.top_n, 1);
    }

    #[test]
    fn analyze_request_skips_malformed_records() {
        let request: ApiAnalyzeRequest = serde_json::from_str(
            r#"{"comments": [
                {"id": 1, "text": "So clear", "sentimentLabel": "positive", "confidence": 0.9},
                {"id": 2, "text": null, "sentimentLabel": "negative", "confidence": 0.8},
                {"id": true, "text": "odd id", "sentimentLabel": "neutral", "confidence": 0.5},
                {"id": 4, "text": "Too long", "sentimentLabel": "negative", "confidence": "0.7"}
            ]}"#,
        )
        .unwrap();
        let (batch, _) = request.into_parts(&AnalysisConfig::default());
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.comments()[0].id, "1");
        assert_eq!(batch.skipped_count(), 3);
    }

    #[test]
    fn gate_request_accepts_legacy_reply_keys() {
        let request: ApiGateRequest = serde_json::from_str(
            r#"{"candidates": [{"id": 4, "user": "TrollUser", "text": "You suck", "reply": null, "isPremium": false}], "tier": "PRO"}"#,
        )
        .unwrap();
        let (tier, free_limit) = request.resolve(&AnalysisConfig::default()).unwrap();
        assert_eq!(tier, Tier::Pro);
        assert_eq!(free_limit, 2);
        assert_eq!(request.candidates[0].author, "TrollUser");
        assert!(request.candidates[0].reply_text.is_none());
    }

    #[test]
    fn gate_request_rejects_unknown_tier() {
        let request: ApiGateRequest =
            serde_json::from_str(r#"{"candidates": [], "tier": "enterprise"}"#).unwrap();
        let err = request.resolve(&AnalysisConfig::default()).unwrap_err();
        assert!(err.contains("unknown tier"));
    }

    #[test]
    fn gate_request_falls_back_to_configured_tier() {
        let request: ApiGateRequest = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let (tier, _) = request.resolve(&AnalysisConfig::default()).unwrap();
        assert_eq!(tier, Tier::Free);
    }
}
