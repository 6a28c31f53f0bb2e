use crate::{ClassifiedComment, Polarity};

/// A theme and the keywords that signal it. Keywords are lowercase and matched as substrings.
#[derive(Debug, Clone, Copy)]
pub struct ThemeRule {
    pub keywords: &'static [&'static str],
    pub label: &'static str,
}

impl ThemeRule {
    pub fn matches(&self, lowercase_text: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowercase_text.contains(keyword))
    }
}

/// Evaluated top to bottom; the first matching rule is the lead theme.
pub const POSITIVE_THEMES: &[ThemeRule] = &[
    ThemeRule {
        keywords: &["explain", "clear"],
        label: "clear explanation",
    },
    ThemeRule {
        keywords: &["edit"],
        label: "editing",
    },
    ThemeRule {
        keywords: &["helpful", "learn"],
        label: "educational value",
    },
];

pub const NEGATIVE_THEMES: &[ThemeRule] = &[
    ThemeRule {
        keywords: &["audio", "sound"],
        label: "audio quality",
    },
    ThemeRule {
        keywords: &["long", "short"],
        label: "content length",
    },
    ThemeRule {
        keywords: &["clickbait"],
        label: "misleading title",
    },
];

pub fn rules_for(polarity: Polarity) -> &'static [ThemeRule] {
    match polarity {
        Polarity::Positive => POSITIVE_THEMES,
        Polarity::Negative => NEGATIVE_THEMES,
    }
}

/// Labels of every rule matched by at least one comment, in rule order.
pub fn detect_themes(rules: &[ThemeRule], comments: &[&ClassifiedComment]) -> Vec<&'static str> {
    let texts: Vec<String> = comments
        .iter()
        .map(|comment| comment.text.to_lowercase())
        .collect();

    rules
        .iter()
        .filter(|rule| texts.iter().any(|text| rule.matches(text)))
        .map(|rule| rule.label)
        .collect()
}
