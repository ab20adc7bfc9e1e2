mod client;
mod countries;
mod error;
mod generate;
mod links;
mod parser;
mod pdf;
mod record;
mod render;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "country_briefs", about = "Country fact sheets via a chat model, and link harvesting from them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the model for every flagged row and write one PDF per country
    Generate {
        /// Input table with country, continent and flag columns
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Root folder for the continent subfolders
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Override the chat model
        #[arg(short, long)]
        model: Option<String>,
        /// Max countries to generate
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Stop at the first failing country
        #[arg(long)]
        strict: bool,
    },
    /// Collect the "Youtube Links" section of every PDF into a CSV
    Links {
        /// Folder to scan recursively
        #[arg(default_value = "output")]
        input_dir: PathBuf,
        /// CSV file to write
        #[arg(default_value = "youtube_links.csv")]
        csv_path: PathBuf,
    },
    /// Print the items of one labeled section of a PDF
    Sections {
        pdf: PathBuf,
        /// Section header to look for
        #[arg(long, default_value = parser::YOUTUBE_LINKS)]
        header: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            input,
            output_dir,
            model,
            limit,
            strict,
        } => {
            let mut settings = settings::Settings::load()?;
            if let Some(model) = model {
                settings.model = model;
            }
            let api_key = settings::api_key()?;
            let client = client::OpenAIClient::from_settings(&settings, api_key);

            let opts = generate::GenerateOptions {
                input: input.unwrap_or_else(|| PathBuf::from(&settings.input_csv)),
                output_dir: output_dir.unwrap_or_else(|| PathBuf::from(&settings.output_dir)),
                limit,
                strict,
            };
            let source = generate::ChatSource {
                client: &client,
                settings: &settings,
            };
            let stats = generate::run(&source, &opts)?;
            stats.print();
            Ok(())
        }
        Commands::Links { input_dir, csv_path } => {
            if let Some(message) = missing_directory(&input_dir) {
                println!("{}", message);
                std::process::exit(2);
            }
            let (rows, stats) = links::collect_links(&input_dir, parser::YOUTUBE_LINKS)?;
            links::write_csv(&csv_path, &rows)?;
            if stats.unreadable > 0 {
                println!(
                    "Scanned {} documents ({} unreadable).",
                    stats.documents, stats.unreadable
                );
            }
            println!("Wrote {} rows to {}", stats.rows, csv_path.display());
            Ok(())
        }
        Commands::Sections { pdf: path, header } => {
            let text = pdf::extract_text(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let items = parser::extract_section(Some(&text), &header);
            for item in &items {
                println!("{}", item);
            }
            if items.is_empty() {
                println!("No \"{}\" section in {}", header, path.display());
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Message printed (on stdout, before exiting with status 2) when the scan root is missing.
fn missing_directory(dir: &Path) -> Option<String> {
    (!dir.exists()).then(|| format!("Directory not found: {}", dir.display()))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn links_defaults() {
        let cli = Cli::try_parse_from(["country_briefs", "links"]).unwrap();
        match cli.command {
            Commands::Links { input_dir, csv_path } => {
                assert_eq!(input_dir, PathBuf::from("output"));
                assert_eq!(csv_path, PathBuf::from("youtube_links.csv"));
            }
            _ => panic!("expected links"),
        }
    }

    #[test]
    fn links_positional_overrides() {
        let cli = Cli::try_parse_from(["country_briefs", "links", "pdfs", "out.csv"]).unwrap();
        match cli.command {
            Commands::Links { input_dir, csv_path } => {
                assert_eq!(input_dir, PathBuf::from("pdfs"));
                assert_eq!(csv_path, PathBuf::from("out.csv"));
            }
            _ => panic!("expected links"),
        }
    }

    #[test]
    fn missing_scan_root_message() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(missing_directory(dir.path()), None);

        let gone = dir.path().join("nope");
        assert_eq!(
            missing_directory(&gone),
            Some(format!("Directory not found: {}", gone.display()))
        );
    }

    #[test]
    fn durations() {
        use std::time::Duration;
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
