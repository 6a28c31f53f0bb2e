use serde::Serialize;
use std::collections::BTreeMap;

use crate::{AnalysisBatch, ClassifiedComment, EngagementTier, Intent, Sentiment, ToxicityCategory};

pub const DEFAULT_SAFE_KEY: &str = "safe";

/// Counts and rounded percentages for one axis.
///
/// `unclassified` holds comments without a value on the axis; it stays out of `percentages`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisDistribution {
    pub counts: BTreeMap<String, usize>,
    pub percentages: BTreeMap<String, u32>,
    pub unclassified: usize,
}

impl AxisDistribution {
    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn percent(&self, category: &str) -> u32 {
        self.percentages.get(category).copied().unwrap_or(0)
    }

    pub fn classified_total(&self) -> usize {
        self.counts.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distributions {
    pub total_count: usize,
    pub sentiment: AxisDistribution,
    pub intent: AxisDistribution,
    pub engagement: AxisDistribution,
    pub toxicity: AxisDistribution,
    /// Share of comments with no toxicity category.
    pub safety_score: u32,
}

impl Distributions {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn sentiment_percent(&self, sentiment: Sentiment) -> u32 {
        self.sentiment.percent(sentiment.label())
    }

    pub fn intent_percent(&self, intent: Intent) -> u32 {
        self.intent.percent(intent.label())
    }

    pub fn engagement_percent(&self, tier: EngagementTier) -> u32 {
        self.engagement.percent(tier.label())
    }

    pub fn toxicity_percent(&self, category: ToxicityCategory) -> u32 {
        self.toxicity.percent(category.label())
    }

    /// Most frequent toxicity category; ties go to the earlier category in declaration order.
    pub fn dominant_toxicity(&self) -> Option<(ToxicityCategory, usize)> {
        let mut best: Option<(ToxicityCategory, usize)> = None;
        for category in ToxicityCategory::ALL {
            let count = self.toxicity.count(category.label());
            if count == 0 {
                continue;
            }
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((category, count));
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    safe_key: String,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_SAFE_KEY)
    }
}

impl Aggregator {
    pub fn new(safe_key: impl Into<String>) -> Self {
        Self {
            safe_key: safe_key.into(),
        }
    }

    pub fn safe_key(&self) -> &str {
        &self.safe_key
    }

    pub fn aggregate(&self, comments: &[ClassifiedComment]) -> Distributions {
        let total = comments.len();

        let mut sentiment = Tally::seeded(Sentiment::ALL.iter().map(|s| s.label()));
        let mut intent = Tally::seeded(Intent::ALL.iter().map(|i| i.label()));
        let mut engagement = Tally::seeded(EngagementTier::ALL.iter().map(|t| t.label()));
        let mut toxicity = Tally::seeded(
            ToxicityCategory::ALL
                .iter()
                .map(|c| c.label())
                .chain(std::iter::once(self.safe_key.as_str())),
        );

        for comment in comments {
            sentiment.record(comment.sentiment_label.label());

            match comment.intent {
                Some(value) => intent.record(value.label()),
                None => intent.record_unclassified(),
            }

            match comment.engagement_tier {
                Some(value) => engagement.record(value.label()),
                None => engagement.record_unclassified(),
            }

            if comment.is_safe() {
                toxicity.record(&self.safe_key);
            } else {
                for category in &comment.toxicity_categories {
                    toxicity.record(category.label());
                }
            }
        }

        let toxicity = toxicity.finish(total);
        let safety_score = toxicity.percent(&self.safe_key);

        Distributions {
            total_count: total,
            sentiment: sentiment.finish(total),
            intent: intent.finish(total),
            engagement: engagement.finish(total),
            toxicity,
            safety_score,
        }
    }
}

pub fn aggregate(batch: &AnalysisBatch) -> Distributions {
    Aggregator::default().aggregate(batch.comments())
}

/// round-half-up(100 * count / total), 0 for an empty total.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let count = count as u64;
    let total = total as u64;
    ((200 * count + total) / (2 * total)) as u32
}

struct Tally {
    counts: BTreeMap<String, usize>,
    unclassified: usize,
}

impl Tally {
    fn seeded<'k>(keys: impl IntoIterator<Item = &'k str>) -> Self {
        Self {
            counts: keys.into_iter().map(|key| (key.to_string(), 0)).collect(),
            unclassified: 0,
        }
    }

    fn record(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    fn record_unclassified(&mut self) {
        self.unclassified += 1;
    }

    fn finish(self, total: usize) -> AxisDistribution {
        let percentages = self
            .counts
            .iter()
            .map(|(key, count)| (key.clone(), percentage(*count, total)))
            .collect();
        AxisDistribution {
            counts: self.counts,
            percentages,
            unclassified: self.unclassified,
        }
    }
}
