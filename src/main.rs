//! cmdline - run the option processor against a JSON-described command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cmdline::{render_report, CommandLine, Config, Report, Values};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Typed command-line option processing driven by a JSON config.
#[derive(Parser, Debug)]
#[command(name = "cmdline", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse arguments and print the bound values as JSON
    Parse {
        #[command(flatten)]
        source: ConfigSource,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,

        /// Arguments to parse (the program name comes from the config)
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Validate a config and summarize it
    Check {
        #[command(flatten)]
        source: ConfigSource,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ConfigSource {
    /// JSON configuration
    #[arg(long)]
    config: Option<String>,

    /// Path to a JSON configuration file
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,
}

impl ConfigSource {
    fn load(&self) -> Result<Config> {
        let config = match (&self.config, &self.config_file) {
            (Some(json), _) => Config::from_json(json).context("failed to parse config JSON")?,
            (None, Some(path)) => Config::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            (None, None) => anyhow::bail!("no config given"),
        };
        config.validate().context("invalid config")?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            source,
            pretty,
            args,
        } => {
            let cfg = source.load()?;
            let values = Values::new(&cfg);
            let mut cl = CommandLine::new();
            values.register(&mut cl);

            let argv = std::iter::once(cfg.effective_name().to_string()).chain(args);
            let outcome = cl.parse(argv);

            let report = Report::new(&values, &cl, &outcome);
            println!(
                "{}",
                render_report(&report, pretty).context("failed to render report")?
            );

            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Check { source } => {
            let cfg = source.load()?;
            let aliases: usize = cfg.options.iter().map(|o| o.aliases.len()).sum();
            println!(
                "{}: {} options ({} aliases), {} positionals, overflow {}",
                cfg.effective_name(),
                cfg.options.len(),
                aliases,
                cfg.positionals.len(),
                if cfg.overflow { "on" } else { "off" }
            );
        }
    }

    Ok(())
}
