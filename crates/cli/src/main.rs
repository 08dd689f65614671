mod echo;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use lens_core::{Article, Reader, ReaderConfig};
use owo_colors::OwoColorize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted articles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Html,
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: html, text, json", s)),
        }
    }
}

/// Extract the readable article from a web page
#[derive(Parser, Debug)]
#[command(name = "lens")]
#[command(version)]
#[command(about = "Extract readable articles from web pages", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (html, text, json)
    #[arg(short, long, default_value = "html", value_name = "FORMAT")]
    format: OutputFormat,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Maximum pages to merge when following pagination
    #[arg(long, default_value = "10", value_name = "NUM")]
    max_pages: usize,

    /// Do not follow next-page links
    #[arg(long)]
    single_page: bool,

    /// Do not rewrite article links into footnotes
    #[arg(long)]
    no_footnotes: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn reader_config(args: &Args) -> ReaderConfig {
    let mut config = ReaderConfig::new()
        .max_pages(args.max_pages)
        .footnotes(!args.no_footnotes)
        .timeout(args.timeout);
    if let Some(user_agent) = &args.user_agent {
        config = config.user_agent(user_agent.clone());
    }
    if args.single_page {
        config = config.single_page();
    }
    config
}

fn render(article: &Article, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Html => article.content.clone(),
        OutputFormat::Text => article.text_content.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(article).context("Failed to serialize article")?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        echo::print_banner();
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lens_core=debug")),
            )
            .with_writer(io::stderr)
            .init();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let reader = Reader::with_config(reader_config(&args));

    let article = if args.input.starts_with("http://") || args.input.starts_with("https://") {
        if args.verbose {
            echo::print_step(1, 3, &format!("Fetching from {}", args.input.bright_white().underline()));
        }
        reader
            .fetch_and_parse(&args.input)
            .await
            .context("Failed to extract article")?
    } else {
        let html = if args.input == "-" {
            if args.verbose {
                echo::print_step(1, 3, "Reading from stdin");
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        } else {
            if args.verbose {
                echo::print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
            }
            fs::read_to_string(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
        };

        if args.verbose {
            eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
            eprintln!();
            echo::print_step(2, 3, "Extracting article");
        }

        reader.parse(&html).context("Failed to extract article")?
    };

    if args.verbose {
        echo::print_article_details(&article);
        echo::print_step(3, 3, "Writing output");
        eprintln!();
    }

    let output = render(&article, args.format)?;

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
