//! simple-infer CLI — 从任务文件运行批量推理
//!
//! Usage:
//!   simple-infer run <job.(json|yaml)> [--out <path>]   Run a job and print the summary
//!   simple-infer check <job.(json|yaml)>                Validate a job file
//!   simple-infer version                                Show version information

use anyhow::{bail, Context};
use simple_infer::{BatchInference, InferenceJob};
use std::path::PathBuf;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("simple-infer {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"simple-infer — bounded-concurrency batch inference

USAGE:
    simple-infer <COMMAND> [OPTIONS]

COMMANDS:
    run <job> [--out <path>]    Run a job file and emit the result summary as JSON
    check <job>                 Validate a job file without calling the API
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    OPENAI_API_KEY              API key (keyring entry simple-infer/openai is tried first)
    SIMPLE_INFER_TIMEOUT_SECS   Per-call timeout in seconds (default: 60)
    SIMPLE_INFER_PROXY_URL      Optional HTTP(S) proxy
    RUST_LOG                    Log filter (default: info)"#
    );
}

fn load_job(args: &[String]) -> anyhow::Result<(InferenceJob, PathBuf)> {
    let Some(path) = args.first() else {
        bail!("missing job file argument");
    };
    let path = PathBuf::from(path);
    let job = InferenceJob::from_path(&path)
        .with_context(|| format!("failed to load job {}", path.display()))?;
    Ok((job, path))
}

fn cmd_check(args: &[String]) -> anyhow::Result<()> {
    let (job, path) = load_job(args)?;
    println!(
        "{}: ok ({} conversations)",
        path.display(),
        job.conversations.len()
    );
    println!("{}", serde_json::to_string_pretty(&job.api_params())?);
    Ok(())
}

fn cmd_run(args: &[String]) -> anyhow::Result<()> {
    let (job, _) = load_job(args)?;

    let mut out: Option<PathBuf> = None;
    let mut rest = args.iter().skip(1);
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--out" | "-o" => {
                let Some(p) = rest.next() else {
                    bail!("--out requires a path");
                };
                out = Some(PathBuf::from(p));
            }
            other => bail!("unknown option: {other}"),
        }
    }

    let result = BatchInference::new().run_job_blocking(&job)?;
    let json = serde_json::to_string_pretty(&result)?;
    match out {
        Some(p) => std::fs::write(&p, json)
            .with_context(|| format!("failed to write {}", p.display()))?,
        None => println!("{json}"),
    }

    eprintln!(
        "{} succeeded, {} failed",
        result.success_count, result.failure_count
    );
    Ok(())
}
