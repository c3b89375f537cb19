use crate::cli::Cli;
use crate::core::{ProcessingStep, SwarmError, SwarmResult};
use crate::engine::{self, RunOutcome};
use crate::services::{RunOptions, WorkList};
use crate::steps::CommandStep;
use std::sync::Arc;

/// Builds run options from the options file and command-line flags
///
/// Flags take precedence over the file.
pub fn build_options(cli: &Cli) -> SwarmResult<RunOptions> {
    let base = match &cli.options {
        Some(path) => RunOptions::from_file(path)?,
        None => RunOptions::default(),
    };

    let mut overrides = RunOptions::new().with_silent(cli.silent);
    if let Some(concurrency) = cli.concurrency {
        overrides = overrides.with_concurrency(concurrency);
    }

    let options = base.merge(overrides);
    options.validate()?;
    Ok(options)
}

/// Patterns first, then each `--group` as one item
pub fn build_work_list(cli: &Cli) -> WorkList {
    let mut work_list = WorkList::from_patterns(cli.patterns.iter().cloned());
    for group in cli.group_lists() {
        work_list.push_group(group);
    }
    work_list
}

pub fn build_step(cli: &Cli) -> SwarmResult<CommandStep> {
    let (program, args) = cli
        .command
        .split_first()
        .ok_or_else(|| SwarmError::configuration("no command given"))?;
    Ok(CommandStep::new(program, args.iter().cloned()))
}

/// Execute the run command in whichever role this process was started in
pub async fn execute_run(cli: &Cli) -> SwarmResult<RunOutcome> {
    let options = build_options(cli)?;
    let work_list = build_work_list(cli);
    let step: Arc<dyn ProcessingStep> = Arc::new(build_step(cli)?);

    engine::run(&work_list, step, &options).await
}
