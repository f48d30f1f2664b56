use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use tender_radar::model::{Contract, Criterion, RiskCategory};
use tender_radar::query::{Order, OrderBy, ScoreFilter};
use tender_radar::store::JsonStore;
use tender_radar::ScoreError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 1;
const EXIT_STORE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a config file populated with the default thresholds
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Load contracts from a JSON file into the store
    Import {
        /// Path to a JSON array of contracts
        file: PathBuf,
    },
    /// Score one criterion for one contract (read-only unless --save)
    Score {
        criterion: Criterion,
        contract_id: String,
        /// Persist the score and reconsolidate
        #[arg(long)]
        save: bool,
    },
    /// Score one bounded batch of pending contracts for a criterion
    Batch { criterion: Criterion },
    /// Score every pending contract for a criterion (or for all eight)
    Run {
        /// Criterion to run; omit to run all eight in order
        criterion: Option<Criterion>,
    },
    /// Recompute total score and risk category from stored criterion scores
    Consolidate {
        /// Contract to consolidate; omit to reconsolidate every scored contract
        contract_id: Option<String>,
    },
    /// Clear one criterion's score for a contract and reconsolidate
    Reset {
        criterion: Criterion,
        contract_id: String,
    },
    /// List scored contracts, filtered and paginated
    List {
        #[arg(long)]
        category: Option<RiskCategory>,
        #[arg(long)]
        min_score: Option<u16>,
        #[arg(long, value_enum, default_value = "total-score")]
        order_by: OrderBy,
        #[arg(long, value_enum, default_value = "desc")]
        order: Order,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },
    /// Aggregate statistics over every scored contract
    Report,
}

#[derive(Parser, Debug)]
#[command(name = "tender-radar")]
#[command(about = "Procurement contract anomaly scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/tender-radar/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the JSON store file (overrides the config)
    #[arg(short, long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    let start_time = Instant::now();

    // Init does not need a store or validated config.
    if let Commands::Init { force } = cli.command {
        let path = cli.config.map(PathBuf::from);
        match tender_radar::config::write_sample_config(path, force) {
            Ok(written) => {
                println!("Config written to {}", written.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    let config_path = cli.config.map(PathBuf::from);
    let config = match tender_radar::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let scoring = config.scoring.clone().unwrap_or_default();
    if let Err(errors) = tender_radar::config::validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let store_path = cli
        .store
        .clone()
        .or(config.store.clone())
        .map(PathBuf::from)
        .unwrap_or_else(tender_radar::config::get_store_path);

    if cli.verbose {
        eprintln!("Store: {}", store_path.display());
    }

    let mut store = match JsonStore::open(&store_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Store error: {}", e);
            std::process::exit(EXIT_STORE);
        }
    };

    let use_colors = tender_radar::output::should_use_colors();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::Import { file } => {
            let contracts = match read_contracts(&file) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Import error: {}", e);
                    std::process::exit(EXIT_DATA);
                }
            };
            let imported = contracts.len();
            match store.import_contracts(contracts) {
                Ok(total) => {
                    println!("Imported {} contracts ({} now in store)", imported, total)
                }
                Err(e) => {
                    eprintln!("Store error: {}", e);
                    std::process::exit(EXIT_STORE);
                }
            }
        }

        Commands::Score {
            criterion,
            contract_id,
            save,
        } => {
            let result = if save {
                tender_radar::scoring::score_and_save(&mut store, &scoring, criterion, &contract_id)
            } else {
                tender_radar::scoring::score_criterion(&store, &scoring, criterion, &contract_id)
            };
            match result {
                Ok(result) => {
                    println!("{}", tender_radar::output::format_result(&result, use_colors))
                }
                Err(e) => exit_domain_error(e),
            }
        }

        Commands::Batch { criterion } => {
            match tender_radar::batch::run_batch(&mut store, &scoring, criterion, verbose) {
                Ok(stats) => println!("{}", tender_radar::output::format_batch_stats(&stats)),
                Err(e) => exit_domain_error(e),
            }
        }

        Commands::Run { criterion } => {
            let criteria: Vec<Criterion> = match criterion {
                Some(c) => vec![c],
                None => Criterion::ALL.to_vec(),
            };
            for criterion in criteria {
                match tender_radar::batch::process_all(&mut store, &scoring, criterion, verbose) {
                    Ok(stats) => {
                        println!("{}", tender_radar::output::format_batch_stats(&stats))
                    }
                    Err(e) => exit_domain_error(e),
                }
            }
        }

        Commands::Consolidate { contract_id } => match contract_id {
            Some(id) => {
                match tender_radar::consolidation::consolidate_and_save(&mut store, &id) {
                    Ok(consolidated) => println!(
                        "{}",
                        tender_radar::output::format_consolidated(&consolidated, use_colors)
                    ),
                    Err(e) => exit_domain_error(e),
                }
            }
            None => match tender_radar::consolidation::consolidate_all(&mut store) {
                Ok(updated) => println!("Reconsolidated: {} rows updated", updated),
                Err(e) => exit_domain_error(e),
            },
        },

        Commands::Reset {
            criterion,
            contract_id,
        } => {
            match tender_radar::consolidation::reset_criterion(&mut store, &contract_id, criterion)
            {
                Ok(consolidated) => println!(
                    "{}",
                    tender_radar::output::format_consolidated(&consolidated, use_colors)
                ),
                Err(e) => exit_domain_error(e),
            }
        }

        Commands::List {
            category,
            min_score,
            order_by,
            order,
            page,
            page_size,
        } => {
            let filter = ScoreFilter {
                category,
                min_score,
                order_by,
                order,
                page,
                page_size,
            };
            match tender_radar::query::contracts_by_score(&store, &filter) {
                Ok(page) => println!(
                    "{}",
                    tender_radar::output::format_score_table(&page, use_colors)
                ),
                Err(e) => exit_domain_error(e),
            }
        }

        Commands::Report => match tender_radar::query::score_report(&store) {
            Ok(report) => println!(
                "{}",
                tender_radar::output::format_report(&report, use_colors)
            ),
            Err(e) => exit_domain_error(e),
        },
    }

    if verbose {
        eprintln!("Done in {:?}", start_time.elapsed());
    }

    std::process::exit(EXIT_SUCCESS);
}

fn read_contracts(path: &PathBuf) -> anyhow::Result<Vec<Contract>> {
    let file = std::fs::File::open(path)
        .map_err(|e| anyhow::anyhow!("cannot open {}: {}", path.display(), e))?;
    let contracts: Vec<Contract> = serde_json::from_reader(file)
        .map_err(|e| anyhow::anyhow!("invalid contract JSON in {}: {}", path.display(), e))?;
    Ok(contracts)
}

fn exit_domain_error(e: ScoreError) -> ! {
    eprintln!("Error: {}", e);
    let code = if e.is_infrastructure() {
        EXIT_STORE
    } else {
        EXIT_DATA
    };
    std::process::exit(code);
}
