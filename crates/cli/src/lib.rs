pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use basket_core::config::{ConfigOverrides, LoadOptions};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "basket",
    about = "Basket aisle recommender CLI",
    long_about = "Recommend aisles for a shopping cart from pretrained segment rules, and inspect the configuration and model artifacts behind them.",
    after_help = "Examples:\n  basket recommend 24852 13176 21137 --top-k 3\n  basket demo\n  basket doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Config file (default: basket.toml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "DIR", help = "Model artifact directory override")]
    artifacts: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Recommend aisles for the given product ids")]
    Recommend {
        #[arg(value_name = "PRODUCT_ID", help = "Product ids currently in the cart")]
        product_ids: Vec<u64>,
        #[arg(long, help = "Maximum number of aisles to return (0 returns none)")]
        top_k: Option<usize>,
        #[arg(long, help = "Log every pipeline step")]
        verbose: bool,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Recommend aisles for a fixed demo cart with verbose diagnostics")]
    Demo,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and model artifacts and run a demo recommendation")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    fn load_options(&self, verbose: Option<bool>) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                artifacts_dir: self.artifacts.clone(),
                verbose,
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Recommend { product_ids, top_k, verbose, json } => {
            let options = cli.load_options(verbose.then_some(true));
            commands::recommend::run(&options, product_ids, *top_k, *json)
        }
        Command::Demo => commands::demo::run(&cli.load_options(Some(true))),
        Command::Config => commands::CommandResult {
            exit_code: 0,
            output: commands::config::run(&cli.load_options(None)),
        },
        Command::Doctor { json } => commands::doctor::run(&cli.load_options(None), *json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
