mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use comment_pulse::{
    format_confidence, format_count, format_percent, synthetic, AnalysisBatch, AnalysisConfig,
    AnalysisPipeline, AnalysisReport, ClassifiedComment, EntitlementDecision, EntitlementGate,
    ReplyCandidate, Sentiment, Tier,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "comment-pulse", about = "Video comment sentiment digest")]
struct Cli {
    /// Path to an analysis.toml; defaults to COMMENT_PULSE_CONFIG_PATH or config/analysis.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    Analyze(AnalyzeArgs),
    Gate(GateArgs),
    Demo(DemoArgs),
    InitConfig(InitConfigArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct AnalyzeArgs {
    /// JSON array of classified comments; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    top_n: Option<usize>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct GateArgs {
    /// JSON array of reply candidates; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    tier: Option<String>,
    #[arg(long)]
    free_limit: Option<usize>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct DemoArgs {
    #[arg(long, default_value_t = synthetic::DEFAULT_BATCH_LEN)]
    count: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/analysis.toml")]
    path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Analyze(AnalyzeArgs::default()));

    if let Command::InitConfig(args) = &command {
        return init_config(&args.path);
    }

    let (config, _) = AnalysisConfig::load(cli.config)?;

    match command {
        Command::Analyze(args) => run_analyze(args, config),
        Command::Gate(args) => run_gate(args, config),
        Command::Demo(args) => run_demo(args, config),
        Command::InitConfig(_) => Ok(()),
        Command::Serve(args) => server::serve(args, config).await,
    }
}

fn run_analyze(args: AnalyzeArgs, mut config: AnalysisConfig) -> Result<(), String> {
    if let Some(top_n) = args.top_n {
        config.ranking.top_n = top_n;
    }
    let payload = read_input(args.input.as_deref())?;
    let batch = AnalysisBatch::from_json(&payload)?;
    let report = AnalysisPipeline::from_config(&config).run(&batch);
    emit_report(&report, args.json)
}

fn run_demo(args: DemoArgs, config: AnalysisConfig) -> Result<(), String> {
    let batch = AnalysisBatch::from_records(synthetic::generate_batch(args.count, args.seed));
    let report = AnalysisPipeline::from_config(&config).run(&batch);
    emit_report(&report, args.json)
}

fn run_gate(args: GateArgs, config: AnalysisConfig) -> Result<(), String> {
    let tier = match args.tier.as_deref() {
        Some(label) => label.parse::<Tier>(),
        None => config.default_tier(),
    }
    .map_err(|err| err.to_string())?;
    let free_limit = args.free_limit.unwrap_or(config.entitlement.free_limit);

    let payload = read_input(args.input.as_deref())?;
    let candidates: Vec<ReplyCandidate> = serde_json::from_str(&payload)
        .map_err(|err| format!("failed to parse reply candidates: {}", err))?;

    let decision = EntitlementGate::new(free_limit).gate(&candidates, tier);
    if args.json {
        return print_json(&decision);
    }
    print_decision(&decision);
    Ok(())
}

fn init_config(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("config already exists: {}", path.display()));
    }
    AnalysisConfig::default().write(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn emit_report(report: &AnalysisReport<'_>, json: bool) -> Result<(), String> {
    if json {
        return print_json(report);
    }

    let distributions = &report.distributions;
    println!("Comments analyzed: {}", format_count(report.total_count));
    if report.skipped_count > 0 {
        println!("Records skipped: {}", format_count(report.skipped_count));
    }
    println!(
        "Sentiment: positive {} | negative {} | neutral {}",
        format_percent(distributions.sentiment_percent(Sentiment::Positive)),
        format_percent(distributions.sentiment_percent(Sentiment::Negative)),
        format_percent(distributions.sentiment_percent(Sentiment::Neutral))
    );
    print_axis("Intent", &distributions.intent.percentages);
    print_axis("Engagement", &distributions.engagement.percentages);
    print_axis("Toxicity", &distributions.toxicity.percentages);
    println!("Safety score: {}", format_percent(distributions.safety_score));

    print_comments("Top positive", &report.top_positive);
    print_comments("Top negative", &report.top_negative);

    println!("\nSummary:\n{}", report.summary_short);
    println!("\nDetailed:\n{}", report.summary_detailed);
    Ok(())
}

fn print_axis(name: &str, percentages: &std::collections::BTreeMap<String, u32>) {
    let parts: Vec<String> = percentages
        .iter()
        .map(|(category, percent)| format!("{} {}", category, format_percent(*percent)))
        .collect();
    println!("{}: {}", name, parts.join(" | "));
}

fn print_comments(title: &str, comments: &[&ClassifiedComment]) {
    if comments.is_empty() {
        return;
    }
    println!("\n{}:", title);
    for comment in comments {
        println!("- [{}] {}", format_confidence(comment.confidence), comment.text);
    }
}

fn print_decision(decision: &EntitlementDecision) {
    println!("Tier: {}", decision.tier.label());
    for reply in &decision.visible_replies {
        println!("\n{}: \"{}\"", reply.author, reply.comment_text);
        if reply.locked {
            println!("  [locked] Upgrade to Pro to unlock this smart reply");
        } else {
            match &reply.reply_text {
                Some(text) => println!("  {}", text),
                None => println!("  [suppressed] No reply generated (toxic/spam)"),
            }
        }
    }
    println!(
        "\nLocked: {} | Not shown: {}",
        decision.locked_count, decision.truncated_count
    );
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize output: {}", err))?;
    println!("{}", payload);
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
    if let Some(path) = path {
        return std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {}", path.display(), err));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    if buffer.trim().is_empty() {
        return Err("missing input: pass --input or pipe JSON on stdin".to_string());
    }
    Ok(buffer)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
