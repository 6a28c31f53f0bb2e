pub mod themes;

use serde::Serialize;

use crate::{
    ClassifiedComment, Distributions, EngagementTier, Intent, Polarity, Sentiment, ToxicityCategory,
};

pub use themes::{detect_themes, ThemeRule, NEGATIVE_THEMES, POSITIVE_THEMES};

pub const PRAISE_FILLER: &str = "the content";
pub const CRITICISM_FILLER: &str = "certain aspects";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub short: String,
    pub detailed: String,
}

/// Narrative tone, chosen from the positive share alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    MostlyLoves,
    Mixed,
    Critical,
}

impl Tone {
    pub fn from_positive_percent(percent: u32) -> Self {
        if percent > 60 {
            Tone::MostlyLoves
        } else if percent > 40 {
            Tone::Mixed
        } else {
            Tone::Critical
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Tone::MostlyLoves => "mostly loves",
            Tone::Mixed => "has mixed feelings about",
            Tone::Critical => "is critical of",
        }
    }

    fn reception(self) -> &'static str {
        match self {
            Tone::MostlyLoves => "a strong positive reception",
            Tone::Mixed => "a mixed reception",
            Tone::Critical => "a largely critical reception",
        }
    }
}

pub fn summarize(
    distributions: &Distributions,
    top_positive: &[&ClassifiedComment],
    top_negative: &[&ClassifiedComment],
) -> Summary {
    let tone = Tone::from_positive_percent(distributions.sentiment_percent(Sentiment::Positive));
    let praise = detect_themes(themes::rules_for(Polarity::Positive), top_positive);
    let criticism = detect_themes(themes::rules_for(Polarity::Negative), top_negative);

    let short = format!(
        "The audience {} the content, praising {} and overall quality. However, there are some complaints about {}.",
        tone.phrase(),
        praise
            .first()
            .map(|theme| format!("the {}", theme))
            .unwrap_or_else(|| PRAISE_FILLER.to_string()),
        criticism.first().copied().unwrap_or(CRITICISM_FILLER),
    );

    let detailed = [
        reception_paragraph(tone, distributions, &praise),
        criticism_paragraph(distributions, &criticism),
        community_paragraph(distributions),
    ]
    .join("\n\n");

    Summary { short, detailed }
}

fn reception_paragraph(tone: Tone, distributions: &Distributions, praise: &[&str]) -> String {
    let mut paragraph = format!(
        "The sentiment analysis indicates {} ({}% positive).",
        tone.reception(),
        distributions.sentiment_percent(Sentiment::Positive)
    );
    if praise.is_empty() {
        paragraph.push_str(" No single strength stood out, so praise centred on the content itself.");
    } else {
        paragraph.push_str(&format!(
            " Viewers particularly appreciated the {}.",
            join_labels(praise)
        ));
    }
    paragraph
}

fn criticism_paragraph(distributions: &Distributions, criticism: &[&str]) -> String {
    let mut paragraph = format!(
        "{}% of comments expressed dissatisfaction and {}% were neutral.",
        distributions.sentiment_percent(Sentiment::Negative),
        distributions.sentiment_percent(Sentiment::Neutral)
    );
    match criticism {
        [] => paragraph.push_str(&format!(
            " Criticism did not cluster around a theme and touched on {} of the video.",
            CRITICISM_FILLER
        )),
        [theme] => paragraph.push_str(&format!(
            " The recurring theme in negative feedback was {}.",
            theme
        )),
        themes => paragraph.push_str(&format!(
            " The recurring themes in negative feedback were {}.",
            join_labels(themes)
        )),
    }
    paragraph
}

fn community_paragraph(distributions: &Distributions) -> String {
    if distributions.is_empty() {
        return "No classified comments were available, so engagement and toxicity breakdowns are not available."
            .to_string();
    }

    let mut paragraph = format!(
        "Engagement metrics show {}% fans, {}% casual viewers, {}% debaters and {}% at risk of churning, \
         with {}% of comments discussing the topic and {}% asking questions. \
         The toxicity level is {} with {}% of comments safe",
        distributions.engagement_percent(EngagementTier::Fan),
        distributions.engagement_percent(EngagementTier::Casual),
        distributions.engagement_percent(EngagementTier::Debate),
        distributions.engagement_percent(EngagementTier::Churn),
        distributions.intent_percent(Intent::Discussion),
        distributions.intent_percent(Intent::Question),
        toxicity_level(distributions.safety_score),
        distributions.safety_score
    );
    match distributions.dominant_toxicity() {
        Some((category, _)) => paragraph.push_str(&format!(
            ", though {}% contained {}.",
            distributions.toxicity_percent(category),
            toxicity_phrase(category)
        )),
        None => paragraph.push('.'),
    }
    paragraph
}

fn toxicity_level(safety_score: u32) -> &'static str {
    if safety_score > 80 {
        "low"
    } else if safety_score > 50 {
        "moderate"
    } else {
        "high"
    }
}

fn toxicity_phrase(category: ToxicityCategory) -> &'static str {
    match category {
        ToxicityCategory::Insult => "insults",
        ToxicityCategory::Threat => "threats",
        ToxicityCategory::Profanity => "profanity",
        ToxicityCategory::IdentityAttack => "identity attacks",
    }
}

fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.to_string(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}
