use super::args::*;

pub(crate) mod pipeline;

use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Summarize(args) => pipeline::summarize(&global, args).await,
        Command::Evaluate(args) => pipeline::evaluate(&global, args).await,
        Command::Run(args) => pipeline::run(&global, args).await,
        Command::Sample => {
            println!("{}", minutes_core::sample::SAMPLE_TRANSCRIPT);
            Ok(SUCCESS)
        }
    }
}
