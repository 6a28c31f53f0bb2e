use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::CommentRecord;

pub const DEFAULT_BATCH_LEN: usize = 200;

const POSITIVE_TEXTS: &[&str] = &[
    "This video changed my life, thank you!",
    "Great explanation of the core concepts.",
    "Love the editing style on this one.",
    "Finally someone explained this clearly.",
    "Subscribed immediately after watching.",
    "So helpful, I learned more here than in a semester.",
];

const NEGATIVE_TEXTS: &[&str] = &[
    "The audio quality is terrible.",
    "Too long, didn't watch.",
    "I disagree with the second point completely.",
    "Clickbait title.",
    "Why is the camera out of focus?",
];

const NEUTRAL_TEXTS: &[&str] = &[
    "What microphone do you use?",
    "Watching this on my lunch break.",
    "Is there a part two coming?",
    "First time on this channel.",
];

// Weights follow the shape of a typical tutorial video's comment section.
const SENTIMENTS: &[(&str, u32)] = &[("positive", 62), ("negative", 14), ("neutral", 24)];
const INTENTS: &[(&str, u32)] = &[
    ("question", 15),
    ("praise", 45),
    ("complaint", 10),
    ("spam", 5),
    ("discussion", 25),
];
const ENGAGEMENT: &[(&str, u32)] = &[("fan", 40), ("casual", 35), ("debate", 15), ("churn", 10)];
const TOXICITY: &[(&str, f64)] = &[
    ("insult", 0.02),
    ("threat", 0.005),
    ("profanity", 0.05),
    ("identityAttack", 0.01),
];

/// Deterministic batch of classified comment records for demos and tests.
pub fn generate_batch(count: usize, seed: u64) -> Vec<CommentRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(count);

    for idx in 0..count {
        let sentiment = pick(&mut rng, SENTIMENTS);
        let pool = match sentiment {
            "positive" => POSITIVE_TEXTS,
            "negative" => NEGATIVE_TEXTS,
            _ => NEUTRAL_TEXTS,
        };
        let text = pool[rng.gen_range(0..pool.len())];

        let intent = if rng.gen::<f64>() < 0.9 {
            Some(pick(&mut rng, INTENTS).to_string())
        } else {
            None
        };
        let engagement = if rng.gen::<f64>() < 0.85 {
            Some(pick(&mut rng, ENGAGEMENT).to_string())
        } else {
            None
        };
        let toxicity: Vec<String> = TOXICITY
            .iter()
            .filter(|(_, rate)| rng.gen::<f64>() < *rate)
            .map(|(label, _)| label.to_string())
            .collect();

        records.push(CommentRecord {
            id: Some(format!("synthetic_{}", idx)),
            text: text.to_string(),
            sentiment_label: Some(sentiment.to_string()),
            confidence: Some(round3(rng.gen_range(0.5..1.0))),
            intent,
            toxicity_categories: Some(toxicity),
            engagement_tier: engagement,
        });
    }

    records
}

fn pick<'a>(rng: &mut StdRng, options: &[(&'a str, u32)]) -> &'a str {
    let total: u32 = options.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (label, weight) in options {
        if roll < *weight {
            return *label;
        }
        roll -= weight;
    }
    options[options.len() - 1].0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
