use tracing::debug;

use crate::config::AnalysisConfig;
use crate::digest::summarize;
use crate::{Aggregator, AnalysisBatch, AnalysisReport, Polarity, Ranker};

#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    aggregator: Aggregator,
    ranker: Ranker,
}

impl AnalysisPipeline {
    pub fn new(aggregator: Aggregator, ranker: Ranker) -> Self {
        Self { aggregator, ranker }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            Aggregator::new(config.toxicity.safe_key.clone()),
            Ranker::new(config.ranking.top_n),
        )
    }

    pub fn run<'a>(&self, batch: &'a AnalysisBatch) -> AnalysisReport<'a> {
        let distributions = self.aggregator.aggregate(batch.comments());
        let top_positive = self.ranker.extract(batch.comments(), Polarity::Positive);
        let top_negative = self.ranker.extract(batch.comments(), Polarity::Negative);
        let summary = summarize(&distributions, &top_positive, &top_negative);

        debug!(
            total = batch.len(),
            skipped = batch.skipped_count(),
            top_positive = top_positive.len(),
            top_negative = top_negative.len(),
            "analysis complete"
        );

        AnalysisReport {
            total_count: distributions.total_count,
            skipped_count: batch.skipped_count(),
            skipped: batch.skipped(),
            distributions,
            top_positive,
            top_negative,
            summary_short: summary.short,
            summary_detailed: summary.detailed,
        }
    }
}
