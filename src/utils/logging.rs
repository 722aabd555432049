// file: src/utils/logging.rs
// description: tracing subscriber setup and colored status lines for the cli
// reference: https://docs.rs/tracing-subscriber

use crate::models::PassageMetadata;
use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `RUST_LOG` wins over the verbose flag when set.
pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

pub fn format_step(step: usize, total: usize, msg: &str) -> String {
    format!("{} {}", format!("[{}/{}]", step, total).cyan().bold(), msg)
}

/// One cited passage as `[n] source p.N (type)` followed by an indented preview.
pub fn format_source(index: usize, source: &PassageMetadata, preview_chars: usize) -> String {
    let preview: String = source.content.chars().take(preview_chars).collect();
    let ellipsis = if source.content.chars().count() > preview_chars {
        "..."
    } else {
        ""
    };

    format!(
        "{} {} p.{} ({})\n    {}{}",
        format!("[{}]", index).cyan().bold(),
        source.source.bold(),
        source.page,
        source.kind,
        preview.replace('\n', " ").dimmed(),
        ellipsis
    )
}
