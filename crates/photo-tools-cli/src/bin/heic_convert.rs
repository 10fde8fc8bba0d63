use anyhow::Result;
use clap::{Parser, ValueEnum};
use heic_convert::{ConvertOptions, FileOutcome, LibHeifDecoder, OutputFormat};
use photo_tools_cli::logger::ConsoleLogger;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Convert HEIC images to other formats
#[derive(Parser)]
#[command(name = "heic-convert", version)]
struct Cli {
    /// Directory containing HEIC files
    #[arg(short = 'd', long, default_value = ".")]
    directory: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "JPEG")]
    format: FormatArg,

    /// Delete original HEIC files after conversion
    #[arg(long)]
    delete_original: bool,

    /// Process images sequentially (default is parallel)
    #[arg(long)]
    no_parallel: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    #[value(name = "JPEG", alias = "jpeg")]
    Jpeg,
    #[value(name = "JPG", alias = "jpg")]
    Jpg,
    #[value(name = "PNG", alias = "png")]
    Png,
    #[value(name = "WEBP", alias = "webp")]
    Webp,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg | FormatArg::Jpg => Self::Jpeg,
            FormatArg::Png => Self::Png,
            FormatArg::Webp => Self::WebP,
        }
    }
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            input_dir: self.directory.clone(),
            format: self.format.into(),
            delete_original: self.delete_original,
            parallel: !self.no_parallel,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One report line per converted or failed file
fn describe(outcome: &FileOutcome) -> String {
    match &outcome.result {
        Ok(converted) => format!(
            " {}: {} -> {}",
            if converted.deleted_original {
                "Converted and deleted"
            } else {
                "Converted"
            },
            file_name(&outcome.source),
            file_name(&converted.output)
        ),
        Err(e) => format!(" Failed to convert {}: {}", file_name(&outcome.source), e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ConsoleLogger::new(cli.verbose).init()?;
    let options = cli.options();

    println!(
        "Converting HEIC files in '{}' to {}...",
        options.input_dir.display(),
        options.format
    );
    println!("Delete original files: {}", options.delete_original);
    println!("Parallel processing: {}", options.parallel);
    println!("{}", "-".repeat(50));

    let summary = heic_convert::convert_directory(&options, Arc::new(LibHeifDecoder), |outcome| {
        println!("{}", describe(outcome))
    })
    .await?;

    if summary.outcomes.is_empty() {
        println!("No HEIC files found in the specified directory.");
        return Ok(());
    }

    println!("{}", "-".repeat(50));
    println!(
        "Conversion complete: {} successful, {} failed",
        summary.converted(),
        summary.failed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heic_convert::{ConvertError, Converted};

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let options = Cli::parse_from(["heic-convert"]).options();
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "heic-convert",
            "-d",
            "photos",
            "-f",
            "webp",
            "--delete-original",
            "--no-parallel",
        ]);
        let options = cli.options();
        assert_eq!(options.input_dir, PathBuf::from("photos"));
        assert_eq!(options.format, OutputFormat::WebP);
        assert!(options.delete_original);
        assert!(!options.parallel);
    }

    #[test]
    fn test_jpg_is_jpeg() {
        let cli = Cli::parse_from(["heic-convert", "-f", "JPG"]);
        assert_eq!(cli.options().format, OutputFormat::Jpeg);
        assert!(Cli::try_parse_from(["heic-convert", "-f", "GIF"]).is_err());
    }

    #[test]
    fn test_report_lines() {
        let converted = FileOutcome {
            source: PathBuf::from("/photos/a.heic"),
            result: Ok(Converted {
                output: PathBuf::from("/photos/a.jpg"),
                deleted_original: true,
            }),
        };
        assert_eq!(describe(&converted), " Converted and deleted: a.heic -> a.jpg");

        let failed = FileOutcome {
            source: PathBuf::from("/photos/b.heic"),
            result: Err(ConvertError::Decode {
                path: PathBuf::from("/photos/b.heic"),
                reason: "bad header".to_string(),
            }),
        };
        assert!(describe(&failed).starts_with(" Failed to convert b.heic: "));
    }
}
