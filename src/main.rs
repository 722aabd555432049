// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use pdf_qa::history::{Role, TranscriptStore};
use pdf_qa::utils::logging::{
    format_error, format_info, format_source, format_step, format_success, format_warning,
    init_logger,
};
use pdf_qa::{AnswerOutcome, AnswerRecord, Config, QaService, QueryResponse};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

const SOURCE_PREVIEW_CHARS: usize = 160;

#[derive(Parser)]
#[command(name = "pdf_qa")]
#[command(version)]
#[command(about = "Question answering over English, Hindi and Hinglish PDFs", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a PDF file or every PDF under a directory
    Ingest {
        path: PathBuf,

        /// Drop the existing index first
        #[arg(long)]
        clear: bool,
    },

    /// Answer a single question
    Ask {
        question: String,

        /// Print the answer and sources as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive question loop; an empty line or `exit` quits
    Chat,

    /// Show the passages retrieved for a query
    Search {
        query: String,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Show index statistics
    Stats,

    /// Delete every indexed passage and the chat history
    Clear {
        #[arg(long)]
        confirm: bool,
    },

    /// Check pdfium, tesseract, the index and the model endpoints
    Verify,

    /// Show or clear the chat transcript
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    match cli.command {
        Commands::Ingest { path, clear } => cmd_ingest(config, path, clear).await?,
        Commands::Ask { question, json } => cmd_ask(config, &question, json).await?,
        Commands::Chat => cmd_chat(config).await?,
        Commands::Search { query, limit } => cmd_search(config, &query, limit).await?,
        Commands::Stats => cmd_stats(config).await?,
        Commands::Clear { confirm } => cmd_clear(config, confirm).await?,
        Commands::Verify => cmd_verify(config).await?,
        Commands::History { clear } => cmd_history(config, clear).await?,
    }

    Ok(())
}

async fn open_service(config: Config) -> Result<QaService> {
    QaService::open(config)
        .await
        .context("Failed to initialize the question-answering service")
}

async fn cmd_ingest(mut config: Config, path: PathBuf, clear: bool) -> Result<()> {
    config.ingest.show_progress = true;
    let service = open_service(config).await?;
    let total = if clear { 2 } else { 1 };

    if clear {
        println!("{}", format_step(1, total, "Clearing existing index"));
        service.clear_index().await.context("Failed to clear index")?;
    }

    println!(
        "{}",
        format_step(total, total, &format!("Ingesting {}", path.display()))
    );
    let report = service
        .ingest(&path)
        .await
        .with_context(|| format!("Failed to ingest {}", path.display()))?;

    println!(
        "{}",
        format_success(&format!(
            "Indexed {} passages into {}",
            report.chunk_count, report.index_location
        ))
    );
    println!(
        "{}",
        format_info(&format!(
            "{} documents, {} pages ({} OCR-only), {} tables",
            report.stats.documents_processed,
            report.stats.pages_extracted,
            report.stats.ocr_only_pages,
            report.stats.tables_found
        ))
    );

    if report.stats.documents_failed > 0 {
        println!(
            "{}",
            format_warning(&format!("{} documents failed", report.stats.documents_failed))
        );
    }
    if report.stats.degradations() > 0 {
        println!(
            "{}",
            format_warning(&format!(
                "{} OCR and {} table extraction fallbacks",
                report.stats.ocr_failures, report.stats.table_failures
            ))
        );
    }

    Ok(())
}

async fn cmd_ask(config: Config, question: &str, json: bool) -> Result<()> {
    let history_path = config.answer.history_path.clone();
    let service = open_service(config).await?;

    let record = service.ask(question).await.context("Failed to answer question")?;
    record_history(history_path, &record).await;

    if json {
        let response = QueryResponse::from(&record);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_answer(&record);
    }

    Ok(())
}

async fn cmd_chat(config: Config) -> Result<()> {
    let service = open_service(config.clone()).await?;
    let mut history = TranscriptStore::open(config.answer.history_path.clone())
        .await
        .context("Failed to open chat history")?;

    println!(
        "{}",
        format_info("Ask questions in English, Hindi or Hinglish. Empty line or `exit` quits.")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() || question.eq_ignore_ascii_case("exit") {
            break;
        }

        match service.ask(question).await {
            Ok(record) => {
                print_answer(&record);
                if let Err(e) = history.record(&record).await {
                    warn!("Failed to save chat history: {}", e);
                }
            }
            Err(e) => println!("{}", format_error(&e.to_string())),
        }
    }

    service.close().await.context("Failed to close service")?;
    Ok(())
}

async fn cmd_search(config: Config, query: &str, limit: usize) -> Result<()> {
    let service = open_service(config).await?;
    let results = service
        .search(query, limit)
        .await
        .context("Vector search failed")?;

    if results.is_empty() {
        println!("\nNo passages found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Lowering retrieval.min_relevance");
        println!("  - Checking that documents have been ingested");
        return Ok(());
    }

    println!("\nSearch Results for: \"{}\"\n", query);
    println!("Found {} passage(s)\n", results.len());
    println!("{}", "=".repeat(80));

    for (idx, hit) in results.hits.iter().enumerate() {
        println!("\n{}. {}", idx + 1, hit.format_summary(300));
    }

    println!("\n{}", "=".repeat(80));
    Ok(())
}

async fn cmd_stats(config: Config) -> Result<()> {
    let service = open_service(config).await?;
    let count = service
        .document_count()
        .await
        .context("Failed to count passages")?;

    println!(
        "{}",
        format_info(&format!(
            "{} passages indexed at {}",
            count,
            service.index_location()
        ))
    );

    Ok(())
}

async fn cmd_clear(config: Config, confirm: bool) -> Result<()> {
    if !confirm {
        println!(
            "{}",
            format_warning(
                "This will delete every indexed passage and the chat history. Use --confirm to proceed"
            )
        );
        return Ok(());
    }

    let service = open_service(config).await?;
    service
        .reset()
        .await
        .context("Failed to clear index and chat history")?;
    println!("{}", format_success("Index and chat history cleared"));

    Ok(())
}

async fn cmd_verify(config: Config) -> Result<()> {
    let service = open_service(config).await?;
    let report = service.health_report().await;

    println!("{}", report.render());
    if report.is_ready() {
        println!("{}", format_success("Setup looks usable"));
        Ok(())
    } else {
        println!("{}", format_error("Setup is incomplete"));
        Err(anyhow::anyhow!("Setup verification failed"))
    }
}

async fn cmd_history(config: Config, clear: bool) -> Result<()> {
    let mut history = TranscriptStore::open(config.answer.history_path.clone())
        .await
        .context("Failed to open chat history")?;

    if clear {
        history.clear().await.context("Failed to clear chat history")?;
        println!("{}", format_success("Chat history cleared"));
        return Ok(());
    }

    if history.is_empty() {
        println!("{}", format_info("No chat history yet"));
        return Ok(());
    }

    for entry in history.entries() {
        let speaker = match entry.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!(
            "[{}] {}: {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            speaker,
            entry.content
        );
        for (idx, source) in entry.sources.iter().enumerate() {
            println!("  {}", format_source(idx + 1, source, SOURCE_PREVIEW_CHARS));
        }
    }

    Ok(())
}

async fn record_history(path: PathBuf, record: &AnswerRecord) {
    match TranscriptStore::open(path).await {
        Ok(mut history) => {
            if let Err(e) = history.record(record).await {
                warn!("Failed to save chat history: {}", e);
            }
        }
        Err(e) => warn!("Failed to open chat history: {}", e),
    }
}

fn print_answer(record: &AnswerRecord) {
    let answer = match record.outcome {
        AnswerOutcome::Answered => format_success(&record.grounded_answer),
        AnswerOutcome::NotFound => format_warning(&record.grounded_answer),
        AnswerOutcome::NoDocuments | AnswerOutcome::GenerationFailed => {
            format_error(&record.grounded_answer)
        }
    };
    println!("\n{}\n", answer);

    for (idx, source) in record.citations().iter().enumerate() {
        println!("{}", format_source(idx + 1, source, SOURCE_PREVIEW_CHARS));
    }
}
