use comment_pulse::digest::{detect_themes, NEGATIVE_THEMES, POSITIVE_THEMES};
use comment_pulse::{
    aggregate, summarize, AnalysisBatch, ClassifiedComment, EngagementTier, Intent, Sentiment,
    Tone, ToxicityCategory,
};

fn comment(id: &str, text: &str, sentiment: Sentiment, confidence: f64) -> ClassifiedComment {
    ClassifiedComment::new(id, text, sentiment, confidence)
}

fn sentiment_batch(positive: usize, negative: usize, neutral: usize) -> AnalysisBatch {
    let mut comments = Vec::new();
    for (sentiment, count) in [
        (Sentiment::Positive, positive),
        (Sentiment::Negative, negative),
        (Sentiment::Neutral, neutral),
    ] {
        for _ in 0..count {
            let id = format!("c{}", comments.len());
            comments.push(comment(&id, "nothing specific", sentiment, 0.8));
        }
    }
    AnalysisBatch::from_comments(comments)
}

#[test]
fn tone_thresholds() {
    assert_eq!(Tone::from_positive_percent(62), Tone::MostlyLoves);
    assert_eq!(Tone::from_positive_percent(61), Tone::MostlyLoves);
    assert_eq!(Tone::from_positive_percent(60), Tone::Mixed);
    assert_eq!(Tone::from_positive_percent(45), Tone::Mixed);
    assert_eq!(Tone::from_positive_percent(40), Tone::Critical);
    assert_eq!(Tone::from_positive_percent(0), Tone::Critical);
    assert_eq!(Tone::Mixed.phrase(), "has mixed feelings about");
}

#[test]
fn mostly_loves_with_fillers() {
    let batch = sentiment_batch(62, 14, 24);
    let summary = summarize(&aggregate(&batch), &[], &[]);

    assert_eq!(
        summary.short,
        "The audience mostly loves the content, praising the content and overall quality. \
         However, there are some complaints about certain aspects."
    );
}

#[test]
fn mixed_band_at_forty_five_percent() {
    let batch = sentiment_batch(45, 30, 25);
    let summary = summarize(&aggregate(&batch), &[], &[]);

    assert!(summary.short.starts_with("The audience has mixed feelings about the content"));
}

#[test]
fn lead_theme_follows_table_order() {
    let editing = comment("a", "Love the editing style on this one.", Sentiment::Positive, 0.99);
    let explained = comment("b", "Finally someone EXPLAINED this.", Sentiment::Positive, 0.9);
    let long = comment("c", "Too long, didn't watch.", Sentiment::Negative, 0.95);
    let audio = comment("d", "The audio quality is terrible.", Sentiment::Negative, 0.9);

    let positive = vec![&editing, &explained];
    let negative = vec![&long, &audio];

    assert_eq!(
        detect_themes(POSITIVE_THEMES, &positive),
        vec!["clear explanation", "editing"]
    );
    assert_eq!(
        detect_themes(NEGATIVE_THEMES, &negative),
        vec!["audio quality", "content length"]
    );

    let batch = sentiment_batch(70, 20, 10);
    let summary = summarize(&aggregate(&batch), &positive, &negative);
    assert!(summary.short.contains("praising the clear explanation and overall quality"));
    assert!(summary.short.ends_with("complaints about audio quality."));
}

#[test]
fn theme_matching_ignores_case() {
    let bait = comment("a", "CLICKBAIT!!!", Sentiment::Negative, 0.9);
    assert_eq!(detect_themes(NEGATIVE_THEMES, &[&bait]), vec!["misleading title"]);
}

#[test]
fn detailed_summary_is_pinned() {
    let comments = vec![
        comment("c1", "Great explanation, very clear.", Sentiment::Positive, 0.9)
            .with_intent(Intent::Praise)
            .with_engagement(EngagementTier::Fan),
        comment("c2", "Love the editing.", Sentiment::Positive, 0.8)
            .with_intent(Intent::Praise)
            .with_engagement(EngagementTier::Fan),
        comment("c3", "The sound is awful.", Sentiment::Negative, 0.7)
            .with_intent(Intent::Complaint)
            .with_engagement(EngagementTier::Churn)
            .with_toxicity(ToxicityCategory::Profanity),
        comment("c4", "What camera is this?", Sentiment::Neutral, 0.6)
            .with_intent(Intent::Question)
            .with_engagement(EngagementTier::Casual),
    ];
    let batch = AnalysisBatch::from_comments(comments);
    let distributions = aggregate(&batch);
    let positive: Vec<&ClassifiedComment> = batch.comments()[..2].iter().collect();
    let negative: Vec<&ClassifiedComment> = vec![&batch.comments()[2]];

    let summary = summarize(&distributions, &positive, &negative);

    assert_eq!(
        summary.short,
        "The audience has mixed feelings about the content, praising the clear explanation and overall quality. \
         However, there are some complaints about audio quality."
    );
    let expected = [
        "The sentiment analysis indicates a mixed reception (50% positive). \
         Viewers particularly appreciated the clear explanation and editing.",
        "25% of comments expressed dissatisfaction and 25% were neutral. \
         The recurring theme in negative feedback was audio quality.",
        "Engagement metrics show 50% fans, 25% casual viewers, 0% debaters and 25% at risk of churning, \
         with 0% of comments discussing the topic and 25% asking questions. \
         The toxicity level is moderate with 75% of comments safe, though 25% contained profanity.",
    ]
    .join("\n\n");
    assert_eq!(summary.detailed, expected);

    let again = summarize(&distributions, &positive, &negative);
    assert_eq!(summary, again);
}

#[test]
fn empty_batch_summary_uses_fillers() {
    let distributions = aggregate(&AnalysisBatch::default());
    let summary = summarize(&distributions, &[], &[]);

    assert_eq!(
        summary.short,
        "The audience is critical of the content, praising the content and overall quality. \
         However, there are some complaints about certain aspects."
    );
    let paragraphs: Vec<&str> = summary.detailed.split("\n\n").collect();
    assert_eq!(paragraphs.len(), 3);
    assert!(paragraphs[0].contains("(0% positive)"));
    assert!(paragraphs[1].contains("certain aspects"));
    assert!(paragraphs[2].starts_with("No classified comments were available"));
}

#[test]
fn clean_batch_has_no_toxicity_callout() {
    let batch = sentiment_batch(5, 0, 5);
    let summary = summarize(&aggregate(&batch), &[], &[]);

    assert!(summary
        .detailed
        .ends_with("The toxicity level is low with 100% of comments safe."));
}
