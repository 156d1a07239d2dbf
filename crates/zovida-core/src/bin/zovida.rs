// Zovida command-line interface
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use zovida_core::models::RuleSet;
use zovida_core::{
    load_analyzer, ArtifactBundle, Database, PartialMatchPolicy, Trainer, ZovidaConfig,
};

/// Applies to every `zovida*` target (CLI, core, llm) when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "zovida=info";

#[derive(Parser)]
#[command(name = "zovida")]
#[command(version)]
#[command(about = "Drug-name extraction and drug-pair interaction checks", long_about = None)]
struct Cli {
    /// Artifact store (defaults to ZOVIDA_DB_PATH or zovida.db)
    #[arg(long, global = true, value_name = "DB")]
    db: Option<PathBuf>,

    /// Partial matching policy: first-match or off
    #[arg(long, global = true)]
    partial_match: Option<PartialMatchPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import the reference dataset and/or a curated rule file
    Import {
        /// Reference CSV with Drug_A,Drug_B,Level columns
        #[arg(long, value_name = "CSV")]
        csv: Option<PathBuf>,

        /// Rule set JSON (overrides, typos, lifestyle)
        #[arg(long, value_name = "JSON")]
        rules: Option<PathBuf>,

        /// Replace the existing reference dataset instead of appending
        #[arg(long)]
        replace: bool,
    },

    /// Train the classifier on the stored reference dataset
    Train {
        /// Version label (defaults to a UTC timestamp)
        #[arg(long)]
        version: Option<String>,

        /// Additive smoothing
        #[arg(long, default_value = "1.0")]
        alpha: f64,
    },

    /// Print the drugs found in a text
    Extract {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Grade the interaction between two drugs
    Check {
        drug1: String,
        drug2: String,
    },

    /// Full prescription analysis
    Analyze {
        /// Prescription text, or drug names with --manual
        #[arg(required = true, value_name = "TEXT")]
        text: Vec<String>,

        /// Treat each argument as one hand-entered drug name
        #[arg(long)]
        manual: bool,
    },

    /// Suggest vocabulary names close to a query
    Suggest {
        query: String,

        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Show the loaded artifact versions and fingerprint
    Fingerprint,
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    let mut config = ZovidaConfig::from_env();
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }
    if let Some(policy) = cli.partial_match {
        config.partial_match = policy;
    }

    match cli.command {
        Commands::Import {
            csv,
            rules,
            replace,
        } => import(&config, csv, rules, replace),
        Commands::Train { version, alpha } => train(&config, version, alpha),
        Commands::Extract { text } => {
            let (analyzer, _) = load_analyzer(&config)?;
            print_json(&analyzer.extract_drugs(&text))
        }
        Commands::Check { drug1, drug2 } => {
            let (analyzer, _) = load_analyzer(&config)?;
            let mut result = analyzer.check_interaction(&drug1, &drug2);
            result.confidence = result.display_confidence();
            print_json(&result)
        }
        Commands::Analyze { text, manual } => {
            let (analyzer, _) = load_analyzer(&config)?;
            let mut analysis = if manual {
                analyzer.analyze_manual(&text)
            } else {
                analyzer.analyze_text(&text.join(" "))
            };
            for row in &mut analysis.interactions {
                row.confidence = row.display_confidence();
            }
            print_json(&analysis)
        }
        Commands::Suggest { query, limit } => {
            let (analyzer, _) = load_analyzer(&config)?;
            let suggestions: Vec<_> = analyzer
                .extractor()
                .vocabulary()
                .suggest(&query, limit)
                .into_iter()
                .map(|(name, score)| Suggestion { name, score })
                .collect();
            print_json(&suggestions)
        }
        Commands::Fingerprint => {
            let (_, info) = load_analyzer(&config)?;
            print_json(&info)
        }
    }
}

#[derive(Serialize)]
struct Suggestion {
    name: String,
    score: f64,
}

fn import(
    config: &ZovidaConfig,
    csv: Option<PathBuf>,
    rules: Option<PathBuf>,
    replace: bool,
) -> Result<()> {
    if csv.is_none() && rules.is_none() {
        bail!("nothing to import: pass --csv and/or --rules");
    }

    let db = Database::open(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;

    if let Some(path) = csv {
        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let rows = db
            .import_reference_csv(file, replace)
            .with_context(|| format!("importing {}", path.display()))?;
        println!("imported {} reference rows", rows);
    }

    if let Some(path) = rules {
        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let rule_set: RuleSet = serde_json::from_reader(file)
            .with_context(|| format!("parsing {}", path.display()))?;
        db.replace_rule_set(&rule_set)?;
        println!(
            "imported rule set {} ({} overrides, {} typos, {} lifestyle rules)",
            rule_set.version,
            rule_set.overrides.len(),
            rule_set.typos.len(),
            rule_set.lifestyle.len()
        );
    }

    Ok(())
}

fn train(config: &ZovidaConfig, version: Option<String>, alpha: f64) -> Result<()> {
    let db = Database::open(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;

    let pairs = db.list_reference_pairs()?;
    let model = Trainer::new().with_alpha(alpha).fit(&pairs)?;

    let version =
        version.unwrap_or_else(|| chrono::Utc::now().format("%Y%m%d%H%M%S").to_string());
    ArtifactBundle::save_model(&db, &model, &version)?;

    println!(
        "trained model {} on {} rows ({} labels)",
        version,
        pairs.len(),
        model.labels().len()
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_log_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_parse_import_replace() {
        let cli = Cli::parse_from(["zovida", "--db", "x.db", "import", "--csv", "a.csv", "--replace"]);
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert!(matches!(
            cli.command,
            Commands::Import { csv: Some(_), rules: None, replace: true }
        ));
    }
}
