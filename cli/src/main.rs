//! pdfslice CLI - layout tree queries and table extraction

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use pdfslice::{ConvertOptions, Document, Filter, Loader, TableOptions};

#[derive(Parser)]
#[command(name = "pdfslice")]
#[command(version)]
#[command(about = "Query pdftohtml XML layout trees and extract tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input handling shared by all subcommands.
#[derive(Args)]
struct InputArgs {
    /// Input file (PDF, or XML with --xml)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Treat the input as an already-converted XML tree
    #[arg(long)]
    xml: bool,

    /// Converter binary to invoke for PDF input
    #[arg(long, value_name = "BIN", env = "PDFSLICE_CONVERTER", default_value = "pdftohtml")]
    converter: String,

    /// Keep image elements during conversion
    #[arg(long)]
    images: bool,

    /// Skip hidden text during conversion
    #[arg(long)]
    no_hidden: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract plain text
    Text {
        #[command(flatten)]
        input: InputArgs,

        /// Restrict to these pages (e.g. "1,3,5")
        #[arg(long, value_delimiter = ',')]
        pages: Vec<u32>,

        /// Keep only elements containing this substring
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        /// Keep only elements matching this whitespace-tolerant pattern
        #[arg(long, value_name = "PATTERN")]
        pattern: Option<String>,

        /// Emit one line per visual line instead of one joined string
        #[arg(long)]
        lines: bool,

        /// Leave multi-spaces and soft hyphenation in place
        #[arg(long)]
        raw: bool,
    },

    /// Reconstruct a table and print it as JSON
    Table {
        #[command(flatten)]
        input: InputArgs,

        /// Restrict to these pages (e.g. "1,3,5")
        #[arg(long, value_delimiter = ',')]
        pages: Vec<u32>,

        /// Fix the column count instead of inferring it
        #[arg(long, value_name = "N")]
        columns: Option<usize>,

        /// Row grouping threshold in layout units
        #[arg(long, value_name = "UNITS")]
        row_threshold: Option<f64>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Text {
            input,
            pages,
            search,
            pattern,
            lines,
            raw,
        } => cmd_text(&input, &pages, search.as_deref(), pattern.as_deref(), lines, raw),
        Commands::Table {
            input,
            pages,
            columns,
            row_threshold,
            compact,
        } => cmd_table(&input, &pages, columns, row_threshold, compact),
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load(args: &InputArgs) -> Result<Document, Box<dyn std::error::Error>> {
    let loader = if args.xml {
        Loader::new().with_xml(fs::read(&args.input)?)
    } else {
        let options = ConvertOptions::new()
            .with_binary(&args.converter)
            .with_ignore_images(!args.images)
            .with_hidden_text(!args.no_hidden);
        Loader::new().with_path(&args.input).with_options(options)
    };
    Ok(loader.load()?)
}

/// Build a filter from the shared page/search/pattern options.
fn build_filter(pages: &[u32], search: Option<&str>, pattern: Option<&str>) -> Filter {
    let mut filter = Filter::new();
    if !pages.is_empty() {
        filter = filter.pages(pages.iter().copied());
    }
    if let Some(text) = search {
        filter = filter.search(text);
    }
    if let Some(pattern) = pattern {
        filter = filter.auto_regex(pattern);
    }
    filter
}

fn cmd_text(
    input: &InputArgs,
    pages: &[u32],
    search: Option<&str>,
    pattern: Option<&str>,
    lines: bool,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load(input)?;
    let selection = doc.filter(&build_filter(pages, search, pattern))?;

    if lines {
        for line in selection.get_by_line(pdfslice::LINE_THRESHOLD) {
            if raw {
                println!("{}", line.text());
            } else {
                println!("{}", line.clean_text(true));
            }
        }
    } else if raw {
        println!("{}", selection.text());
    } else {
        println!("{}", selection.clean_text(true));
    }

    Ok(())
}

fn cmd_table(
    input: &InputArgs,
    pages: &[u32],
    columns: Option<usize>,
    row_threshold: Option<f64>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load(input)?;
    let selection = doc.filter(&build_filter(pages, None, None))?;

    let mut options = TableOptions::new();
    if let Some(columns) = columns {
        options = options.with_columns(columns);
    }
    if let Some(threshold) = row_threshold {
        options = options.with_row_threshold(threshold);
    }

    let grid = selection.get_table(&options);
    log::debug!("extracted {} rows", grid.len());

    let json = if compact {
        serde_json::to_string(&grid)?
    } else {
        serde_json::to_string_pretty(&grid)?
    };
    println!("{}", json);

    Ok(())
}

fn cmd_info(input: &InputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.input.display());
    println!("{}: {}", "Pages".bold(), doc.num_pages());

    for page in doc.pages() {
        let count = doc
            .filter(&Filter::new().any_tag().page(page.number))?
            .len();
        let (width, height) = page.dimensions();
        let orientation = if page.is_landscape() {
            "landscape"
        } else {
            "portrait"
        };
        println!(
            "  {} page {}: {}x{} {}, {} elements",
            "├─".dimmed(),
            page.number,
            width,
            height,
            orientation,
            count
        );
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.all().text();
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.len());
    println!("{}: {}", "Fonts".bold(), doc.fontspecs().len());

    Ok(())
}
