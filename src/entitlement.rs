use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::batch::id_from_string_or_number;
use crate::AnalysisError;

pub const DEFAULT_FREE_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
        }
    }
}

impl FromStr for Tier {
    type Err = AnalysisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            _ => Err(AnalysisError::UnknownTier {
                tier: value.to_string(),
            }),
        }
    }
}

/// A suggested reply. `reply_text == None` means moderation suppressed it upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyCandidate {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(alias = "user")]
    pub author: String,
    #[serde(alias = "text")]
    pub comment_text: String,
    #[serde(default, alias = "reply")]
    pub reply_text: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatedReply {
    pub id: String,
    pub author: String,
    pub comment_text: String,
    pub reply_text: Option<String>,
    pub is_premium: bool,
    /// Withheld because the tier does not cover premium replies.
    pub locked: bool,
    /// Withheld upstream by moderation; independent of `locked`.
    pub suppressed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementDecision {
    pub tier: Tier,
    pub visible_replies: Vec<GatedReply>,
    pub locked_count: usize,
    pub truncated_count: usize,
}

#[derive(Debug, Clone)]
pub struct EntitlementGate {
    free_limit: usize,
}

impl Default for EntitlementGate {
    fn default() -> Self {
        Self::new(DEFAULT_FREE_LIMIT)
    }
}

impl EntitlementGate {
    pub fn new(free_limit: usize) -> Self {
        Self { free_limit }
    }

    pub fn free_limit(&self) -> usize {
        self.free_limit
    }

    /// Free tier: truncate to the limit first, then lock premium replies among what is left.
    pub fn gate(&self, candidates: &[ReplyCandidate], tier: Tier) -> EntitlementDecision {
        let shown = match tier {
            Tier::Pro => candidates.len(),
            Tier::Free => candidates.len().min(self.free_limit),
        };

        let visible_replies: Vec<GatedReply> = candidates[..shown]
            .iter()
            .map(|candidate| {
                let locked = tier == Tier::Free && candidate.is_premium;
                GatedReply {
                    id: candidate.id.clone(),
                    author: candidate.author.clone(),
                    comment_text: candidate.comment_text.clone(),
                    reply_text: if locked {
                        None
                    } else {
                        candidate.reply_text.clone()
                    },
                    is_premium: candidate.is_premium,
                    locked,
                    suppressed: candidate.reply_text.is_none(),
                }
            })
            .collect();

        let locked_count = visible_replies.iter().filter(|reply| reply.locked).count();

        EntitlementDecision {
            tier,
            visible_replies,
            locked_count,
            truncated_count: candidates.len() - shown,
        }
    }
}

pub fn gate(
    candidates: &[ReplyCandidate],
    tier: &str,
    free_limit: usize,
) -> Result<EntitlementDecision, AnalysisError> {
    let tier: Tier = tier.parse()?;
    Ok(EntitlementGate::new(free_limit).gate(candidates, tier))
}
