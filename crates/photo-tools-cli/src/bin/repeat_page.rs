use anyhow::Result;
use clap::Parser;
use photo_tools_cli::logger::ConsoleLogger;
use std::path::PathBuf;

/// Duplicate a specific page from a PDF multiple times
#[derive(Parser)]
#[command(name = "repeat-page", version)]
struct Cli {
    /// Input PDF file path
    #[arg(short, long)]
    input: PathBuf,

    /// Output PDF file path
    #[arg(short, long)]
    output: PathBuf,

    /// Page number to duplicate (1-indexed)
    #[arg(short, long)]
    page: u32,

    /// Number of copies to create
    #[arg(short = 'n', long)]
    copies: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ConsoleLogger::new(cli.verbose).init()?;

    let doc = pdf_repeat::load_pdf(&cli.input).await?;
    let repeated = pdf_repeat::repeat_page(&doc, cli.page, cli.copies)?;
    pdf_repeat::save_pdf(repeated, &cli.output).await?;

    println!(
        "Generated {} with {} copies of page {}.",
        cli.output.display(),
        cli.copies,
        cli.page
    );
    Ok(())
}
