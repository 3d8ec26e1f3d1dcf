use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use contract_scorer::config;
use contract_scorer::contracts::load_contracts;
use contract_scorer::output;
use contract_scorer::scoring::{Diagnostics, ModelRegistry, ScoringModel};

const EXIT_SUCCESS: i32 = 0;
const EXIT_SCORING: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Tsv,
    Csv,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the models found in the workbook (default if no subcommand)
    Models,
    /// Print a model's base and coefficient tables
    Show {
        /// Model (sheet) name; all models when omitted
        model: Option<String>,
    },
    /// Score every contract of a CSV or JSON file
    Score {
        /// Contracts file (.csv with a header row, or .json array of objects)
        contracts: PathBuf,

        /// Only evaluate these models (repeatable); all models by default
        #[arg(short, long = "model")]
        models: Vec<String>,

        /// Collect matched / unmatched / not-found features and report them
        #[arg(long)]
        debug: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Write results to this CSV file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "contract-scorer")]
#[command(about = "Score contracts against coefficient models stored in a workbook", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/contract-scorer/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Workbook with one model per sheet (overrides the config file)
    #[arg(short, long, global = true)]
    workbook: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    contract_scorer::telemetry::init(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Models);
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let Some(workbook) = cli.workbook.or_else(|| config.workbook.clone()) else {
        eprintln!("No workbook given.");
        eprintln!("Pass --workbook <FILE> or add it to ~/.config/contract-scorer/config.yaml:");
        eprintln!("  workbook: /path/to/models.xlsx");
        std::process::exit(EXIT_CONFIG);
    };

    let registry = match ModelRegistry::load(&workbook, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load models: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    if cli.verbose {
        eprintln!(
            "Loaded {} models from {} in {:?}",
            registry.len(),
            workbook.display(),
            start_time.elapsed()
        );
    }

    let use_colors = output::should_use_colors();

    match command {
        Commands::Models => {
            println!("{}", output::format_model_list(&registry, use_colors));
        }
        Commands::Show { model: None } => {
            print!("{}", registry);
        }
        Commands::Show { model: Some(name) } => match registry.get(&name) {
            Some(ScoringModel::Weighted(model)) => print!("{}", model),
            Some(ScoringModel::Identity(model)) => {
                println!("Model : {} (identifier, returns the '{}' field)", name, model.field());
            }
            None => {
                eprintln!("Unknown model '{}'. Available: {}", name, registry.names().collect::<Vec<_>>().join(", "));
                std::process::exit(EXIT_INPUT);
            }
        },
        Commands::Score {
            contracts,
            models,
            debug,
            format,
            output: output_path,
        } => {
            let contracts = match load_contracts(&contracts) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Failed to load contracts: {}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            let columns: Vec<String> = if models.is_empty() {
                registry.names().map(str::to_string).collect()
            } else {
                models
            };

            let mut diagnostics = Diagnostics::new();
            let mut rows = Vec::with_capacity(contracts.len());

            for (i, contract) in contracts.iter().enumerate() {
                let tracked = if debug { Some(&mut diagnostics) } else { None };
                match registry.score_with(&columns, contract, tracked) {
                    Ok(row) => rows.push(row),
                    Err(e) => {
                        eprintln!("Contract #{}: {}", i + 1, e);
                        std::process::exit(EXIT_SCORING);
                    }
                }

                if cli.verbose {
                    for (name, model) in columns
                        .iter()
                        .filter_map(|n| registry.get(n).and_then(ScoringModel::as_weighted).map(|m| (n, m)))
                    {
                        eprintln!("{}", output::format_evaluation(name, &model.evaluate(contract), use_colors));
                    }
                }
            }

            if let Some(path) = output_path {
                if let Err(e) = output::write_csv(&path, &columns, &rows) {
                    eprintln!("Failed to write results: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
                if cli.verbose {
                    eprintln!("Wrote {} rows to {}", rows.len(), path.display());
                }
            } else {
                let rendered = match format {
                    Format::Table => output::format_scored_table(&columns, &rows, use_colors),
                    Format::Tsv => output::format_tsv(&columns, &rows),
                    Format::Csv => match output::format_csv(&columns, &rows) {
                        Ok(csv) => csv,
                        Err(e) => {
                            eprintln!("Failed to render CSV: {:#}", e);
                            std::process::exit(EXIT_INPUT);
                        }
                    },
                };
                println!("{}", rendered);
            }

            if debug {
                eprintln!();
                eprintln!("{}", output::format_diagnostics(&diagnostics, use_colors));
            }

            if cli.verbose {
                eprintln!();
                eprintln!("Total: {} contracts in {:?}", rows.len(), start_time.elapsed());
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
