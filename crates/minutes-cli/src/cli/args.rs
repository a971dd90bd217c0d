use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use minutes_core::pipeline::FieldEdit;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "minutes",
    version,
    about = "Summarize meeting transcripts and grade the summary with an LLM judge"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Config file (YAML). Defaults to ./minutes.yaml when present.
    #[arg(long, global = true, env = "MINUTES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the provider from the config file.
    #[arg(long, global = true, value_enum)]
    pub provider: Option<ProviderArg>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProviderArg {
    Openai,
    Fake,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a structured summary of a transcript
    Summarize(SummarizeArgs),
    /// Score an existing summary against its transcript
    Evaluate(EvaluateArgs),
    /// Generate a summary, then score it
    Run(RunArgs),
    /// Print the built-in sample transcript
    Sample,
}

#[derive(Args, Clone)]
pub struct SummarizeArgs {
    /// Transcript file, or `-` for stdin
    #[arg(long, short)]
    pub transcript: PathBuf,
}

#[derive(Args, Clone)]
pub struct EvaluateArgs {
    /// Transcript file, or `-` for stdin
    #[arg(long, short)]
    pub transcript: PathBuf,

    /// Summary file to judge
    #[arg(long, short)]
    pub summary: PathBuf,

    #[command(flatten)]
    pub output: ScorecardArgs,
}

#[derive(Args, Clone)]
pub struct RunArgs {
    /// Transcript file, or `-` for stdin
    #[arg(long, short, required_unless_present = "sample", conflicts_with = "sample")]
    pub transcript: Option<PathBuf>,

    /// Use the built-in sample transcript
    #[arg(long)]
    pub sample: bool,

    /// Also write the generated summary to this file
    #[arg(long)]
    pub summary_out: Option<PathBuf>,

    #[command(flatten)]
    pub output: ScorecardArgs,
}

#[derive(Args, Clone)]
pub struct ScorecardArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Override a scorecard field before printing, e.g. `accuracy.score=9`
    /// or `overall.comment=...` (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub edits: Vec<FieldEdit>,
}
