//! lsp-testspec: compile JSON test specs and verify them against recorded transcripts.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;

use lsp_testspec::{logging, LspTestSpec, ReplayProcessor, TestSpecConfig, Transcript, Variables};

#[derive(Parser, Debug)]
#[command(name = "lsp-testspec")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the wire commands a spec compiles to
    Compile {
        /// Test spec stored as JSON
        spec: PathBuf,

        /// Interpolation variable, as NAME=VALUE
        #[arg(long = "var", value_parser = parse_variable)]
        vars: Vec<(String, String)>,
    },

    /// Replay a recorded transcript against a spec and print the report
    Verify {
        /// Test spec stored as JSON
        spec: PathBuf,

        /// Recorded transcript as JSON
        transcript: PathBuf,

        /// Interpolation variable, as NAME=VALUE
        #[arg(long = "var", value_parser = parse_variable)]
        vars: Vec<(String, String)>,

        /// Directory holding lsp-testspec.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))
}

fn log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Compile { spec, vars } => {
            let spec = LspTestSpec::from_json_file(&spec)?;
            let variables: Variables = vars.into_iter().collect();
            let compiled = spec.compile(&variables)?;
            println!("{}", serde_json::to_string_pretty(&compiled.commands)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify {
            spec,
            transcript,
            vars,
            config,
        } => {
            let spec = LspTestSpec::from_json_file(&spec)?;
            let transcript = Transcript::from_json_file(&transcript)?;
            let variables: Variables = vars.into_iter().collect();
            let config_dir = config.unwrap_or_else(|| PathBuf::from("."));
            let config = TestSpecConfig::load_from_dir(&config_dir)
                .with_context(|| format!("loading config from {}", config_dir.display()))?;

            let mut processor = ReplayProcessor::new(transcript);
            let (_, report) = spec
                .run_with_config(&mut processor, &variables, &config)
                .with_context(|| format!("running test case {}", spec.name()))?;

            match report {
                Some(report) => {
                    println!("{report}");
                    Ok(ExitCode::FAILURE)
                }
                None => {
                    println!("Test case {} passed", spec.name());
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_with_default(log_directive(args.verbose));

    match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
