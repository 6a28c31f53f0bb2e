use std::cmp::Ordering;

use crate::{AnalysisBatch, ClassifiedComment, Polarity};

pub const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct Ranker {
    limit: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl Ranker {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Highest-confidence comments of one polarity. Equal confidence keeps batch order.
    pub fn extract<'a>(
        &self,
        comments: &'a [ClassifiedComment],
        polarity: Polarity,
    ) -> Vec<&'a ClassifiedComment> {
        let wanted = polarity.sentiment();
        let mut matching: Vec<&ClassifiedComment> = comments
            .iter()
            .filter(|comment| comment.sentiment_label == wanted)
            .collect();

        // sort_by is stable
        matching.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        matching.truncate(self.limit);
        matching
    }
}

pub fn extract(batch: &AnalysisBatch, polarity: Polarity, limit: usize) -> Vec<&ClassifiedComment> {
    Ranker::new(limit).extract(batch.comments(), polarity)
}
