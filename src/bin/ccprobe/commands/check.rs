//! `ccprobe compile`, `ccprobe link` and `ccprobe run` commands
//!
//! Run the generic checks against a source file, or stdin with `-`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use ccprobe::probe::{ExecMode, ProbeRequest};
use ccprobe::{ProbeOutcome, Prober, RunOutcome};

use crate::cli::CheckArgs;
use crate::commands::load_prober;

pub fn compile(args: CheckArgs) -> Result<()> {
    let source = read_source(&args.file)?;
    let request = ProbeRequest::compile(description(&args.file), args.lang, source)
        .with_flags(args.flags.as_deref());
    build(request)
}

pub fn link(args: CheckArgs) -> Result<()> {
    let source = read_source(&args.file)?;
    let request = ProbeRequest::link(description(&args.file), args.lang, source)
        .with_flags(args.flags.as_deref());
    build(request)
}

pub fn run(args: CheckArgs) -> Result<()> {
    let source = read_source(&args.file)?;
    let prober = load_prober()?;

    let outcome = prober.try_compile_and_run_detailed(
        &description(&args.file),
        args.lang,
        &source,
        args.flags.as_deref(),
    );

    match outcome {
        RunOutcome::Passed => {
            println!("passed");
            Ok(())
        }
        RunOutcome::RunFailed { status, output } => {
            match status {
                Some(code) => println!("run failed: exit status {}", code),
                None => println!("run failed: terminated by signal"),
            }
            if !output.is_empty() {
                print!("{}", output);
            }
            std::process::exit(1);
        }
        RunOutcome::SpawnFailed { reason } => {
            println!("run failed: {}", reason);
            std::process::exit(1);
        }
        RunOutcome::BuildFailed(build) => {
            print_build_failure(&build);
            std::process::exit(1);
        }
    }
}

fn build(request: ProbeRequest) -> Result<()> {
    let prober = load_prober()?;

    let outcome = prober.run_request(&request, mode(&prober));
    if outcome.is_success() {
        println!("ok");
        return Ok(());
    }

    print_build_failure(&outcome);
    std::process::exit(1);
}

fn print_build_failure(outcome: &ProbeOutcome) {
    match outcome {
        ProbeOutcome::Success { .. } => {}
        ProbeOutcome::Failure { status: Some(code) } => {
            println!("build failed: exit status {}", code)
        }
        ProbeOutcome::Failure { status: None } => println!("build failed: terminated by signal"),
        ProbeOutcome::ExecutionError { reason } => {
            println!("build failed: could not run compiler: {}", reason)
        }
    }
}

fn mode(prober: &Prober) -> ExecMode {
    if prober.settings().verbose {
        ExecMode::Verbose
    } else {
        ExecMode::Silent
    }
}

fn description(file: &Path) -> String {
    if file == Path::new("-") {
        "Checking <stdin>".to_string()
    } else {
        format!("Checking {}", file.display())
    }
}

fn read_source(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read source from stdin")?;
        return Ok(source);
    }

    std::fs::read_to_string(file)
        .with_context(|| format!("failed to read source file: {}", file.display()))
}
