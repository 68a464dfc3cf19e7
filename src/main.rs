//! Canton Charts - command line entry point

use anyhow::{Context, Result};
use canton_charts::config::Settings;
use canton_charts::pipeline::{ChartKind, Pipeline};
use clap::{Parser, Subcommand};
use std::io::stdout;
use std::path::PathBuf;
use tracing::{info, subscriber::set_global_default};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// TOML file overriding the built-in settings
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Open the written chart with the system default application
    #[clap(long, global = true)]
    open: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Averaged daily new cases per canton (default)
    Cases {
        #[clap(flatten)]
        io: IoArgs,
        /// Trailing average window in days
        #[clap(long)]
        window: Option<usize>,
    },
    /// Population per canton, age group and sex
    Demographics {
        #[clap(flatten)]
        io: IoArgs,
    },
    /// Daily test volume colored by positive rate
    Tests {
        #[clap(flatten)]
        io: IoArgs,
    },
}

#[derive(Debug, Default, clap::Args)]
struct IoArgs {
    /// Dataset URL or local CSV path
    #[clap(long)]
    source: Option<String>,
    /// Output HTML file
    #[clap(long)]
    output: Option<PathBuf>,
}

fn start_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let subscriber = Registry::default().with(
        fmt::layer()
            .without_time()
            .with_writer(stdout)
            .with_filter(filter),
    );

    set_global_default(subscriber).context("Unable to set global subscriber")?;
    Ok(())
}

/// Fold command line overrides into the settings and pick the chart.
fn apply_overrides(command: Option<Command>, settings: &mut Settings) -> ChartKind {
    fn apply(io: IoArgs, source: &mut String, output: &mut PathBuf) {
        if let Some(s) = io.source {
            *source = s;
        }
        if let Some(o) = io.output {
            *output = o;
        }
    }

    match command {
        None => ChartKind::Cases,
        Some(Command::Cases { io, window }) => {
            let cases = &mut settings.cases;
            apply(io, &mut cases.source, &mut cases.output);
            if let Some(w) = window {
                cases.window = w;
            }
            ChartKind::Cases
        }
        Some(Command::Demographics { io }) => {
            let demographics = &mut settings.demographics;
            apply(io, &mut demographics.source, &mut demographics.output);
            ChartKind::Demographics
        }
        Some(Command::Tests { io }) => {
            let tests = &mut settings.tests;
            apply(io, &mut tests.source, &mut tests.output);
            ChartKind::Tests
        }
    }
}

fn main() -> Result<()> {
    start_logging()?;

    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let kind = apply_overrides(args.command, &mut settings);

    let output = Pipeline::run(kind, &settings)
        .with_context(|| format!("Failed to produce the {kind} chart"))?;
    println!("{}", output.display());

    if args.open {
        info!(path = %output.display(), "opening chart");
        open::that(&output).with_context(|| format!("Failed to open {}", output.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_runs_cases() {
        let args = Args::parse_from(["canton-charts"]);
        let mut settings = Settings::default();
        assert_eq!(apply_overrides(args.command, &mut settings), ChartKind::Cases);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn flags_override_settings() {
        let args = Args::parse_from([
            "canton-charts",
            "cases",
            "--window",
            "7",
            "--source",
            "data/cases.csv",
            "--output",
            "out.html",
            "--open",
        ]);
        assert!(args.open);

        let mut settings = Settings::default();
        assert_eq!(apply_overrides(args.command, &mut settings), ChartKind::Cases);
        assert_eq!(settings.cases.window, 7);
        assert_eq!(settings.cases.source, "data/cases.csv");
        assert_eq!(settings.cases.output, PathBuf::from("out.html"));
    }

    #[test]
    fn tests_subcommand_only_touches_its_section() {
        let args = Args::parse_from(["canton-charts", "tests", "--output", "t.html"]);
        let mut settings = Settings::default();

        assert_eq!(apply_overrides(args.command, &mut settings), ChartKind::Tests);
        assert_eq!(settings.tests.output, PathBuf::from("t.html"));
        assert_eq!(settings.cases, Settings::default().cases);
    }
}
