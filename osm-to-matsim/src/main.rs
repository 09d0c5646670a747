use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::{error, LevelFilter};

use osm_to_matsim::{execute, OptionMap, ResolvedConfig, RunContext, OPTIONS_HELP};

/// Convert OpenStreetMap data into a MATSim network
#[derive(Parser)]
#[command(version, about, disable_help_flag = true, after_help = OPTIONS_HELP)]
struct Args {
    /// Options as --<key> <value> pairs, listed below
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "OPTIONS")]
    options: Vec<String>,
}

fn main() -> ExitCode {
    if let Err(err) = simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("Couldn't set up logging: {err}");
        return ExitCode::FAILURE;
    }

    let args = Args::parse();
    let options = OptionMap::from_args(&args.options);
    if options.contains("help") {
        print!("{}", Args::command().render_long_help());
        return ExitCode::SUCCESS;
    }

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            error!("Unable to execute parser, terminating");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &OptionMap) -> Result<()> {
    let context = RunContext::capture()?;
    let config = ResolvedConfig::resolve(options, &context)?;
    execute(&config)
}
