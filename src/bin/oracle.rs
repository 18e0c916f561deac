//! oracle CLI tool
//!
//! Operator tooling for the I Ching corpus.
//!
//! ## Commands
//!
//! - `parse <path>`: One-shot parse of a corpus file with diagnostics
//! - `show <number>`: Print one hexagram from the configured corpus
//! - `symbols`: Print the number to glyph map
//! - `cast`: Cast a reading with three coins per line
//! - `stats`: Load the configured corpus and print cache statistics

use clap::{Parser, Subcommand};
use oracle_core::{
    cache::CorpusCache,
    casting::cast,
    codec::parse_all,
    config::OracleConfig,
    hexagram::HexagramRecord,
    OracleError,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oracle")]
#[command(author, version, about = "Inspect and query the I Ching corpus", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "oracle.toml")]
    config: PathBuf,

    /// Corpus file, overriding the configured one
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a corpus file once and display diagnostics
    Parse {
        /// Path to the corpus file
        path: PathBuf,

        /// Print the full parse result as JSON
        #[arg(long)]
        json: bool,

        /// List every parsed hexagram
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print one hexagram
    Show {
        /// Hexagram number, 1 to 64
        number: i64,

        /// Print the section as it appears in the corpus
        #[arg(long)]
        raw: bool,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the number to glyph map
    Symbols {
        #[arg(long)]
        json: bool,
    },

    /// Cast a reading
    Cast {
        #[arg(long)]
        json: bool,
    },

    /// Load the corpus and print cache statistics as JSON
    Stats,
}

fn print_record(record: &HexagramRecord) {
    println!("{} {}", record.symbol_glyph, record);
    println!("\n=== The Judgment ===\n{}", record.judgment);
    println!("\n=== The Image ===\n{}", record.image);
    for (position, line) in record.lines.iter().enumerate() {
        println!("\n=== Line {} ===\n{}", position + 1, line);
    }
}

fn load(cache: &CorpusCache) -> Result<(), OracleError> {
    if cache.prime() {
        Ok(())
    } else {
        Err(OracleError::SourceUnavailable(format!(
            "no hexagram data in {}",
            cache.source().describe()
        )))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = OracleConfig::from_path(&cli.config)?;
    if let Some(corpus) = cli.corpus {
        config = config.with_corpus_path(corpus);
    }

    // Initialize tracing; logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse {
            path,
            json,
            verbose,
        } => {
            let text = std::fs::read_to_string(&path)?;
            let parsed = parse_all(&text);

            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
                return Ok(());
            }

            println!("=== Parse Results ===");
            println!("Sections found: {}", parsed.sections_found);
            println!("Hexagrams parsed: {}", parsed.records.len());
            println!("Sections skipped: {}", parsed.skipped().count());
            let missing: Vec<String> = (1..=64u8)
                .filter(|number| !parsed.records.contains_key(number))
                .map(|number| number.to_string())
                .collect();
            if !missing.is_empty() {
                println!("Missing: {}", missing.join(", "));
            }

            if !parsed.diagnostics.is_empty() {
                println!("\n=== Diagnostics ===");
                for diagnostic in parsed.diagnostics.iter() {
                    println!("{diagnostic}");
                }
            }

            if verbose {
                println!("\n=== Hexagrams ===");
                for record in parsed.records.values() {
                    println!("{} {}", record.symbol_glyph, record.label());
                }
            }
            Ok(())
        }

        Commands::Show { number, raw, json } => {
            let cache = config.build_cache();
            load(&cache)?;
            let record = cache.get_hexagram(number).ok_or_else(|| {
                OracleError::NotFound(format!(
                    "hexagram {number} is not in {}",
                    cache.source().describe()
                ))
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(record.as_ref())?);
            } else if raw {
                println!("{}", record.raw_section);
            } else {
                print_record(&record);
            }
            Ok(())
        }

        Commands::Symbols { json } => {
            let cache = config.build_cache();
            load(&cache)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&cache.get_symbol_map())?);
            } else {
                for record in cache.get_all_hexagrams().values() {
                    println!("{} {}", record.symbol_glyph, record.label());
                }
            }
            Ok(())
        }

        Commands::Cast { json } => {
            let cache = config.build_cache();
            load(&cache)?;
            let reading = cast()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reading)?);
            } else {
                println!("{}", reading.resolve(&cache)?);
                let changing: Vec<String> = reading
                    .changing_lines()
                    .iter()
                    .map(|idx| (idx + 1).to_string())
                    .collect();
                if !changing.is_empty() {
                    println!("\nChanging lines: {}", changing.join(", "));
                }
            }
            Ok(())
        }

        Commands::Stats => {
            let cache = config.build_cache();
            cache.prime();
            println!("{}", serde_json::to_string_pretty(&cache.stats())?);
            Ok(())
        }
    }
}
