//! CLI entry point for capguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `capguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use capguard_app::{
    CheckInput, parse_report_json, render_annotations, render_markdown, run_check,
    runtime_error_report, serialize_report, to_renderable, verdict_exit_code,
};
use capguard_settings::{ConfigFormat, Overrides};
use capguard_types::CapguardReport;
use clap::{ArgAction, Parser, Subcommand};
use std::io::Read;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "capguard",
    version,
    about = "Capability policy guard for Go dependencies, driven by capslock"
)]
struct Cli {
    /// Repository root. Relative config, baseline and list paths resolve against it.
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Path to capguard config (`.toml`, or the JSON linter settings with a `.json` name).
    #[arg(long, default_value = "capguard.toml")]
    config: Utf8PathBuf,

    /// Override profile (strict|warn).
    #[arg(long)]
    profile: Option<String>,

    /// Override maximum findings to emit.
    #[arg(long)]
    max_findings: Option<u32>,

    /// More log output on stderr (-v info, -vv debug). `CAPGUARD_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a capslock document and write artifacts.
    Check {
        /// Output of `capslock -output=j`, or `-` for stdin.
        #[arg(long)]
        input: Utf8PathBuf,

        /// A previous capslock document (relative to the repo root); only capabilities missing
        /// from it are reported.
        #[arg(long)]
        baseline: Option<Utf8PathBuf>,

        /// Import path prefix of the own module (default: from go.mod).
        #[arg(long)]
        module_prefix: Option<String>,

        /// Origin package to evaluate (repeatable). Default: every package starting a call path.
        #[arg(long = "package")]
        packages: Vec<String>,

        /// Standard library package list relative to the repo root, one per line (`go list std`).
        #[arg(long, conflicts_with = "no_stdlib_filter")]
        stdlib_list: Option<Utf8PathBuf>,

        /// Attribute standard library packages like any other dependency.
        #[arg(long)]
        no_stdlib_filter: bool,

        /// Go sources (relative to the repo root) used to anchor findings at the import that
        /// introduces the dependency.
        #[arg(long)]
        source_root: Option<Utf8PathBuf>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/capguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/capguard/comment.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/capguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/capguard/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },
}

struct CheckArgs {
    input: Utf8PathBuf,
    baseline: Option<Utf8PathBuf>,
    module_prefix: Option<String>,
    packages: Vec<String>,
    stdlib_list: Option<Utf8PathBuf>,
    no_stdlib_filter: bool,
    source_root: Option<Utf8PathBuf>,
    report_out: Utf8PathBuf,
    write_markdown: bool,
    markdown_out: Utf8PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Check {
            ref input,
            ref baseline,
            ref module_prefix,
            ref packages,
            ref stdlib_list,
            no_stdlib_filter,
            ref source_root,
            ref report_out,
            write_markdown,
            ref markdown_out,
        } => {
            let args = CheckArgs {
                input: input.clone(),
                baseline: baseline.clone(),
                module_prefix: module_prefix.clone(),
                packages: packages.clone(),
                stdlib_list: stdlib_list.clone(),
                no_stdlib_filter,
                source_root: source_root.clone(),
                report_out: report_out.clone(),
                write_markdown,
                markdown_out: markdown_out.clone(),
            };
            cmd_check(&cli, args)
        }
        Commands::Md { report, output } => cmd_md(report, output),
        Commands::Annotations { report, max } => cmd_annotations(report, max),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env("CAPGUARD_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn cmd_check(cli: &Cli, args: CheckArgs) -> anyhow::Result<()> {
    let repo_root = cli
        .repo_root
        .canonicalize_utf8()
        .unwrap_or_else(|_| cli.repo_root.clone());

    let result = (|| -> anyhow::Result<i32> {
        if !repo_root.exists() {
            anyhow::bail!("repo root does not exist: {}", repo_root);
        }
        // Load config if present; missing file is allowed (defaults apply).
        let cfg_path = repo_root.join(&cli.config);
        let cfg_text = match std::fs::read_to_string(&cfg_path) {
            Ok(text) => text,
            Err(_) => {
                debug!(config = cfg_path.as_str(), "no config file; using defaults");
                String::new()
            }
        };

        let capslock_text = read_input(&args.input)?;

        let overrides = Overrides {
            profile: cli.profile.clone(),
            max_findings: cli.max_findings,
            baseline: args.baseline.as_ref().map(|p| p.to_string()),
            module_prefix: args.module_prefix.clone(),
            stdlib_list: args.stdlib_list.as_ref().map(|p| p.to_string()),
            no_stdlib_filter: args.no_stdlib_filter,
        };

        let source_root = args.source_root.as_ref().map(|p| repo_root.join(p));

        let input = CheckInput {
            repo_root: &repo_root,
            config_text: &cfg_text,
            config_format: ConfigFormat::from_file_name(cli.config.as_str()),
            overrides,
            capslock_text: &capslock_text,
            packages: args.packages.clone(),
            source_root: source_root.as_deref(),
        };

        let output = run_check(input)?;

        write_report_file(&args.report_out, &output.report).context("write report json")?;
        info!(report = args.report_out.as_str(), "report written");

        if args.write_markdown {
            let renderable = to_renderable(&output.report);
            let md = render_markdown(&renderable);
            write_text_file(&args.markdown_out, &md).context("write markdown")?;
        }

        Ok(verdict_exit_code(output.report.verdict))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"));
            let _ = write_report_file(&args.report_out, &report);
            eprintln!("capguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn read_input(path: &Utf8Path) -> anyhow::Result<String> {
    if path.as_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read capslock document from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("read capslock document: {}", path))
}

fn write_report_file(path: &Utf8Path, report: &CapguardReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    let data = serialize_report(report).context("serialize report")?;
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {}", path))?;
    Ok(())
}

fn cmd_md(report_path: Utf8PathBuf, output: Option<Utf8PathBuf>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let renderable = to_renderable(&report);
    let md = render_markdown(&renderable);

    if let Some(out_path) = output {
        write_text_file(&out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}

fn cmd_annotations(report_path: Utf8PathBuf, max: usize) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let renderable = to_renderable(&report);

    for annotation in render_annotations(&renderable, max) {
        println!("{}", annotation);
    }

    Ok(())
}
