//! Command-line interface for the assistant.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use asisten_core::{source_lines, Answer, PasalIndex};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::assistant::{Assistant, ProcessReport, ProcessStatus};
use crate::config::AssistantConfig;
use crate::error::Result;
use crate::loader::load_batch;

/// Default number of entries in the source list.
const DEFAULT_SOURCES: usize = 10;

/// Asisten Hukum - Question answering over Indonesian legal documents.
#[derive(Parser)]
#[command(name = "asisten")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the Pasal articles in a document batch.
    Index {
        /// Plain-text documents (.txt)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the articles as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a single question about a document batch.
    Ask {
        /// Plain-text documents (.txt)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// The question
        #[arg(short, long)]
        query: String,

        /// Maximum number of sources to list
        #[arg(long, default_value_t = DEFAULT_SOURCES)]
        sources: usize,
    },

    /// Interactive chat about a document batch.
    Chat {
        /// Plain-text documents (.txt)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Maximum number of sources to list
        #[arg(long, default_value_t = DEFAULT_SOURCES)]
        sources: usize,
    },
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { files, json } => index_command(&files, json).await,
        Commands::Ask {
            files,
            query,
            sources,
        } => ask_command(&files, &query, sources).await,
        Commands::Chat { files, sources } => chat_command(&files, sources).await,
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the index command.
async fn index_command(files: &[PathBuf], json: bool) -> Result<()> {
    let batch = load_batch(files).await?;
    let index = PasalIndex::build(&batch.fragments);

    if json {
        println!("{}", serde_json::to_string_pretty(index.pasals())?);
        return Ok(());
    }

    println!(
        "{} {} Pasal in {} document(s)",
        style("Found").bold(),
        style(index.len()).cyan(),
        batch.documents.len()
    );
    println!();

    for pasal in index.pasals() {
        let location = match pasal.page {
            Some(page) => format!("{}, halaman {page}", pasal.source),
            None => pasal.source.clone(),
        };
        let first_line = pasal.body.lines().next().unwrap_or_default();
        println!(
            "  {} {} {}",
            style(&pasal.label).green().bold(),
            style(format!("({location})")).dim(),
            first_line
        );
    }

    Ok(())
}

async fn process_with_spinner(assistant: &Assistant, files: &[PathBuf]) -> Result<ProcessReport> {
    let pb = spinner("Memproses dokumen...");
    let result = assistant.process(files).await;
    pb.finish_and_clear();

    let report = result?;
    let status = match report.status {
        ProcessStatus::Indexed => style("Dokumen diproses").green().bold(),
        ProcessStatus::Reused => style("Index dipakai ulang").yellow().bold(),
    };
    println!(
        "{status}: {} ({} Pasal, {} potongan, {})",
        report.documents.join(", "),
        report.pasals,
        report.chunks,
        report.processed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(report)
}

fn print_answer(answer: &Answer, max_sources: usize) {
    println!();
    println!("{}", answer.text);

    let lines = source_lines(&answer.citations, max_sources);
    if !lines.is_empty() {
        println!();
        println!("{}", style("Sumber:").bold());
        for line in lines {
            println!("  - {line}");
        }
    }
    println!();
}

/// Execute the ask command.
async fn ask_command(files: &[PathBuf], query: &str, max_sources: usize) -> Result<()> {
    let assistant = Assistant::new(AssistantConfig::from_env()?)?;
    process_with_spinner(&assistant, files).await?;

    let pb = spinner("Menjawab...");
    let result = assistant.ask(query).await;
    pb.finish_and_clear();

    print_answer(&result?, max_sources);
    Ok(())
}

fn print_chat_help() {
    println!(
        "{}",
        style("Perintah: :proses  :reset  :clear  :riwayat  :keluar").dim()
    );
}

/// Execute the chat command.
///
/// Ctrl-C while a question is being answered cancels that question only.
/// Ctrl-C at the prompt exits.
async fn chat_command(files: &[PathBuf], max_sources: usize) -> Result<()> {
    let assistant = Assistant::new(AssistantConfig::from_env()?)?;
    process_with_spinner(&assistant, files).await?;
    print_chat_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", style(">").cyan().bold());
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match line.trim() {
            "" => continue,
            ":keluar" | ":quit" => break,
            ":proses" => {
                if let Err(e) = process_with_spinner(&assistant, files).await {
                    eprintln!("{} {e}", style("Error:").red().bold());
                }
            }
            ":reset" => {
                assistant.session().reset();
                println!("Dokumen, riwayat dan sumber dihapus. Ketik :proses untuk memuat ulang.");
            }
            ":clear" => {
                assistant.session().clear_history();
                println!("Riwayat chat dihapus.");
            }
            ":riwayat" => {
                for turn in assistant.session().history() {
                    println!(
                        "{} {}",
                        style(format!("[{}]", turn.at.format("%H:%M:%S"))).dim(),
                        turn.content
                    );
                }
            }
            query => {
                let pb = spinner("Menjawab...");
                let result = tokio::select! {
                    result = assistant.ask(query) => Some(result),
                    _ = tokio::signal::ctrl_c() => None,
                };
                pb.finish_and_clear();

                match result {
                    Some(Ok(answer)) => print_answer(&answer, max_sources),
                    Some(Err(e)) => eprintln!("{} {e}", style("Error:").red().bold()),
                    None => println!("{}", style("Dibatalkan.").yellow()),
                }
            }
        }
    }

    Ok(())
}
