//! concat - Concatenate PDF files into a single document.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use pdfconcat::cli::Cli;
use pdfconcat::config::Config;
use pdfconcat::output::{MessageLevel, OutputFormatter};
use pdfconcat::{ConcatError, telemetry};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let concat_error = err.downcast_ref::<ConcatError>();
            if let Some(ConcatError::Usage) = concat_error {
                eprintln!("{}", pdfconcat::USAGE);
            } else {
                let formatter = OutputFormatter::default();
                eprintln!("{}", formatter.render(MessageLevel::Error, &format!("Error: {err:?}")));
            }
            ExitCode::from(concat_error.map_or(1, ConcatError::exit_code))
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::try_from(cli)?;
    telemetry::init(config.log_directive())?;

    let report = pdfconcat::run(&config)?;

    if config.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    }

    Ok(())
}
