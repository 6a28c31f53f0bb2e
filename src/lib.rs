pub mod aggregate;
pub mod batch;
pub mod config;
pub mod digest;
pub mod entitlement;
pub mod error;
pub mod pipeline;
pub mod ranking;
pub mod synthetic;

use serde::Serialize;
use std::collections::BTreeSet;

pub use aggregate::{aggregate, Aggregator, AxisDistribution, Distributions};
pub use batch::{AnalysisBatch, CommentRecord};
pub use config::AnalysisConfig;
pub use digest::{summarize, Summary, Tone};
pub use entitlement::{gate, EntitlementDecision, EntitlementGate, GatedReply, ReplyCandidate, Tier};
pub use error::AnalysisError;
pub use pipeline::AnalysisPipeline;
pub use ranking::{extract, Ranker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn parse_label(value: &str) -> Option<Self> {
        match normalize_label(value).as_str() {
            "positive" | "pos" => Some(Sentiment::Positive),
            "negative" | "neg" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    Question,
    Praise,
    Complaint,
    Spam,
    Discussion,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Question,
        Intent::Praise,
        Intent::Complaint,
        Intent::Spam,
        Intent::Discussion,
    ];

    pub fn parse_label(value: &str) -> Option<Self> {
        match normalize_label(value).as_str() {
            "question" | "questions" => Some(Intent::Question),
            "praise" => Some(Intent::Praise),
            "complaint" | "complaints" => Some(Intent::Complaint),
            "spam" => Some(Intent::Spam),
            "discussion" => Some(Intent::Discussion),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Intent::Question => "question",
            Intent::Praise => "praise",
            Intent::Complaint => "complaint",
            Intent::Spam => "spam",
            Intent::Discussion => "discussion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EngagementTier {
    Fan,
    Casual,
    Debate,
    Churn,
}

impl EngagementTier {
    pub const ALL: [EngagementTier; 4] = [
        EngagementTier::Fan,
        EngagementTier::Casual,
        EngagementTier::Debate,
        EngagementTier::Churn,
    ];

    pub fn parse_label(value: &str) -> Option<Self> {
        match normalize_label(value).as_str() {
            "fan" | "fans" => Some(EngagementTier::Fan),
            "casual" => Some(EngagementTier::Casual),
            // "hries" is the high-risk/high-reward key older payloads use for debaters
            "debate" | "hries" => Some(EngagementTier::Debate),
            "churn" => Some(EngagementTier::Churn),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EngagementTier::Fan => "fan",
            EngagementTier::Casual => "casual",
            EngagementTier::Debate => "debate",
            EngagementTier::Churn => "churn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToxicityCategory {
    Insult,
    Threat,
    Profanity,
    IdentityAttack,
}

impl ToxicityCategory {
    pub const ALL: [ToxicityCategory; 4] = [
        ToxicityCategory::Insult,
        ToxicityCategory::Threat,
        ToxicityCategory::Profanity,
        ToxicityCategory::IdentityAttack,
    ];

    pub fn parse_label(value: &str) -> Option<Self> {
        match normalize_label(value).as_str() {
            "insult" => Some(ToxicityCategory::Insult),
            "threat" => Some(ToxicityCategory::Threat),
            "profanity" => Some(ToxicityCategory::Profanity),
            "identityattack" => Some(ToxicityCategory::IdentityAttack),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToxicityCategory::Insult => "insult",
            ToxicityCategory::Threat => "threat",
            ToxicityCategory::Profanity => "profanity",
            ToxicityCategory::IdentityAttack => "identityAttack",
        }
    }
}

/// Sentiment side used for ranked extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn sentiment(self) -> Sentiment {
        match self {
            Polarity::Positive => Sentiment::Positive,
            Polarity::Negative => Sentiment::Negative,
        }
    }
}

/// One comment after upstream classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedComment {
    pub id: String,
    pub text: String,
    pub sentiment_label: Sentiment,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub toxicity_categories: BTreeSet<ToxicityCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement_tier: Option<EngagementTier>,
}

impl ClassifiedComment {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        sentiment_label: Sentiment,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sentiment_label,
            confidence,
            intent: None,
            toxicity_categories: BTreeSet::new(),
            engagement_tier: None,
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_engagement(mut self, tier: EngagementTier) -> Self {
        self.engagement_tier = Some(tier);
        self
    }

    pub fn with_toxicity(mut self, category: ToxicityCategory) -> Self {
        self.toxicity_categories.insert(category);
        self
    }

    pub fn is_safe(&self) -> bool {
        self.toxicity_categories.is_empty()
    }
}

/// Everything produced for one batch. Borrows the ranked comments from the batch it was built from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport<'a> {
    pub total_count: usize,
    pub skipped_count: usize,
    pub skipped: &'a [AnalysisError],
    pub distributions: Distributions,
    pub top_positive: Vec<&'a ClassifiedComment>,
    pub top_negative: Vec<&'a ClassifiedComment>,
    pub summary_short: String,
    pub summary_detailed: String,
}

pub fn analyze(batch: &AnalysisBatch) -> AnalysisReport<'_> {
    analyze_with_config(batch, &AnalysisConfig::default())
}

pub fn analyze_with_config<'a>(
    batch: &'a AnalysisBatch,
    config: &AnalysisConfig,
) -> AnalysisReport<'a> {
    AnalysisPipeline::from_config(config).run(batch)
}

fn normalize_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn format_count(value: usize) -> String {
    let mut chars: Vec<char> = value.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_percent(value: u32) -> String {
    format!("{}%", value)
}

pub fn format_confidence(value: f64) -> String {
    format!("{:.2}", value)
}
