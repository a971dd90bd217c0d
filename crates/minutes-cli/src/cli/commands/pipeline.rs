use crate::cli::args::{
    EvaluateArgs, GlobalArgs, ProviderArg, RunArgs, ScorecardArgs, SummarizeArgs,
};
use crate::exit_codes::{CONFIG_ERROR, STAGE_FAILED, SUCCESS};
use anyhow::Context;
use minutes_core::config::{load_or_default, MinutesConfig, ProviderKind};
use minutes_core::judge::JudgeRuntimeConfig;
use minutes_core::providers::llm::{build_stage_client, Stage};
use minutes_core::report::render_scorecard;
use minutes_core::sample::SAMPLE_TRANSCRIPT;
use minutes_core::{Judge, PipelineController, PipelineError, SummaryGenerator};
use serde_json::json;
use std::io::Read;
use std::path::Path;

fn load_config(global: &GlobalArgs) -> anyhow::Result<MinutesConfig> {
    let mut cfg = load_or_default(global.config.as_deref())?;
    if let Some(provider) = global.provider {
        cfg.provider.kind = match provider {
            ProviderArg::Openai => ProviderKind::Openai,
            ProviderArg::Fake => ProviderKind::Fake,
        };
    }
    Ok(cfg)
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if is_stdin(path) {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn generator(cfg: &MinutesConfig) -> anyhow::Result<SummaryGenerator> {
    Ok(SummaryGenerator::new(build_stage_client(cfg, Stage::Generator)?))
}

fn judge(cfg: &MinutesConfig) -> anyhow::Result<Judge> {
    Ok(Judge::new(
        JudgeRuntimeConfig::from(&cfg.judge),
        build_stage_client(cfg, Stage::Judge)?,
    ))
}

/// Map a stage error to an exit code, telling the user what happened.
fn stage_failed(err: &PipelineError) -> i32 {
    match err {
        PipelineError::GuardRejected(reason) => {
            eprintln!("error: {}", reason);
            CONFIG_ERROR
        }
        _ => {
            tracing::error!(error = %err, "stage failed");
            eprintln!("error: {}", err.user_notice());
            eprintln!("  cause: {}", err);
            STAGE_FAILED
        }
    }
}

/// Apply `--set` edits through an edit session and commit them.
fn apply_edits(
    controller: &mut PipelineController,
    output: &ScorecardArgs,
) -> anyhow::Result<bool> {
    if output.edits.is_empty() {
        return Ok(false);
    }
    let session = controller.begin_edit()?;
    for edit in &output.edits {
        session.apply(edit);
    }
    controller.commit_edit()?;
    Ok(true)
}

fn print_scorecard(
    controller: &PipelineController,
    output: &ScorecardArgs,
    edited: bool,
    include_summary: bool,
) -> anyhow::Result<()> {
    let eval = controller
        .evaluation()
        .context("no evaluation available after a successful run")?;
    if output.json {
        let mut doc = json!({ "evaluation": eval, "edited": edited });
        if include_summary {
            doc["summary"] = json!(controller.summary());
        }
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        if include_summary {
            println!("{}\n", controller.summary().trim_end());
        }
        print!("{}", render_scorecard(eval));
        if edited {
            println!("(edited)");
        }
    }
    Ok(())
}

pub async fn summarize(global: &GlobalArgs, args: SummarizeArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let transcript = read_input(&args.transcript)?;
    let generator = generator(&cfg)?;

    let mut controller = PipelineController::with_transcript(transcript);
    if let Err(e) = controller.run_generation(&generator).await {
        return Ok(stage_failed(&e));
    }
    println!("{}", controller.summary().trim_end());
    Ok(SUCCESS)
}

pub async fn evaluate(global: &GlobalArgs, args: EvaluateArgs) -> anyhow::Result<i32> {
    if is_stdin(&args.transcript) && is_stdin(&args.summary) {
        anyhow::bail!("--transcript and --summary cannot both read stdin (-)");
    }
    let cfg = load_config(global)?;
    let transcript = read_input(&args.transcript)?;
    let summary = read_input(&args.summary)?;
    let judge = judge(&cfg)?;

    let mut controller = PipelineController::with_transcript(transcript);
    controller.set_summary(summary)?;
    if let Err(e) = controller.run_evaluation(&judge).await {
        return Ok(stage_failed(&e));
    }
    let edited = apply_edits(&mut controller, &args.output)?;
    print_scorecard(&controller, &args.output, edited, false)?;
    Ok(SUCCESS)
}

pub async fn run(global: &GlobalArgs, args: RunArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let transcript = match &args.transcript {
        Some(path) => read_input(path)?,
        None => SAMPLE_TRANSCRIPT.to_string(),
    };
    let generator = generator(&cfg)?;
    let judge = judge(&cfg)?;

    let mut controller = PipelineController::with_transcript(transcript);
    if let Err(e) = controller.run_generation(&generator).await {
        return Ok(stage_failed(&e));
    }
    if let Some(out) = &args.summary_out {
        std::fs::write(out, controller.summary())
            .with_context(|| format!("failed to write {}", out.display()))?;
    }
    if let Err(e) = controller.run_evaluation(&judge).await {
        return Ok(stage_failed(&e));
    }
    let edited = apply_edits(&mut controller, &args.output)?;
    print_scorecard(&controller, &args.output, edited, true)?;
    Ok(SUCCESS)
}
