//! Directory conversion
//!
//! Every HEIC file in one directory is decoded, re-encoded next to the source
//! with the new extension, and optionally deleted afterwards. Files are
//! independent, so a failure only affects its own file.

use crate::decode::HeicDecoder;
use crate::types::{ConvertError, OutputFormat, Result};
use image::DynamicImage;
use std::any::Any;
use std::fs::OpenOptions;
use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Extensions (lowercase) treated as HEIC input
const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub input_dir: PathBuf,
    pub format: OutputFormat,
    pub delete_original: bool,
    /// Convert files concurrently (one worker per CPU)
    pub parallel: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            format: OutputFormat::Jpeg,
            delete_original: false,
            parallel: true,
        }
    }
}

/// A successfully written output file
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub output: PathBuf,
    pub deleted_original: bool,
}

/// Result for one source file
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub result: Result<Converted>,
}

/// Outcomes of a directory run, in the order the files finished
#[derive(Debug, Default)]
pub struct ConversionSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl ConversionSummary {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }
}

/// List HEIC files in `dir` (not recursive), sorted by file name.
pub async fn find_heic_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    match tokio::fs::metadata(dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        _ => {
            return Err(ConvertError::DirectoryNotFound {
                path: dir.to_owned(),
            });
        }
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            continue;
        }
        let path = entry.path();
        let is_heic = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                HEIC_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            });
        if is_heic {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Output path: same directory and stem, new extension
pub fn output_path_for(source: &Path, format: OutputFormat) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    source.with_file_name(format!("{}{}", stem, format.extension()))
}

/// Convert a single file. The source is deleted only after the output is written.
pub fn convert_file(
    decoder: &dyn HeicDecoder,
    source: &Path,
    format: OutputFormat,
    delete_original: bool,
) -> Result<Converted> {
    let image = decoder.decode(source)?;
    // JPEG has no alpha channel
    let image = match format {
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    };

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;

    let output = output_path_for(source, format);
    write_atomically(&output, &bytes)?;

    if delete_original {
        std::fs::remove_file(source)?;
    }
    log::debug!("{} -> {}", source.display(), output.display());

    Ok(Converted {
        output,
        deleted_original: delete_original,
    })
}

/// Convert every HEIC file in `options.input_dir`.
///
/// `on_file` sees each outcome as soon as its file is done. A failed file is
/// reported and counted; only a missing directory fails the whole run.
pub async fn convert_directory(
    options: &ConvertOptions,
    decoder: Arc<dyn HeicDecoder>,
    mut on_file: impl FnMut(&FileOutcome),
) -> Result<ConversionSummary> {
    let files = find_heic_files(&options.input_dir).await?;
    let mut summary = ConversionSummary::default();
    if files.is_empty() {
        log::info!("No HEIC files in {}", options.input_dir.display());
        return Ok(summary);
    }

    let workers = if options.parallel {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        1
    };
    log::info!(
        "Converting {} file(s) to {} with {} worker(s)",
        files.len(),
        options.format,
        workers
    );

    let permits = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();
    for source in files {
        let permits = Arc::clone(&permits);
        let decoder = Arc::clone(&decoder);
        let format = options.format;
        let delete_original = options.delete_original;
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let job_source = source.clone();
            let joined = tokio::task::spawn_blocking(move || {
                convert_file(decoder.as_ref(), &job_source, format, delete_original)
            })
            .await;
            let result = match joined {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(ConvertError::Decode {
                    path: source.clone(),
                    reason: panic_reason(e.into_panic()),
                }),
                Err(e) => Err(e.into()),
            };
            FileOutcome { source, result }
        });

        // Sequential runs finish each file before starting the next
        if !options.parallel {
            if let Some(joined) = tasks.join_next().await {
                record(joined?, &mut summary, &mut on_file);
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        record(joined?, &mut summary, &mut on_file);
    }
    Ok(summary)
}

fn record(
    outcome: FileOutcome,
    summary: &mut ConversionSummary,
    on_file: &mut impl FnMut(&FileOutcome),
) {
    if let Err(e) = &outcome.result {
        log::warn!("Failed to convert {}: {}", outcome.source.display(), e);
    }
    on_file(&outcome);
    summary.outcomes.push(outcome);
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("decoder panicked: {}", message)
}

/// Replace `path` with `bytes` via a temporary file in the same directory,
/// refusing to replace a read-only file.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Ok(metadata) = std::fs::metadata(path) {
        if metadata.is_file() {
            if metadata.permissions().readonly() {
                return Err(std::io::Error::new(
                    ErrorKind::PermissionDenied,
                    format!("{} is read-only", path.display()),
                )
                .into());
            }
            OpenOptions::new().write(true).open(path)?;
        }
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".heic-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_keeps_stem_and_directory() {
        let source = Path::new("/photos/IMG_0001.HEIC");
        assert_eq!(
            output_path_for(source, OutputFormat::Jpeg),
            PathBuf::from("/photos/IMG_0001.jpg")
        );
        assert_eq!(
            output_path_for(source, OutputFormat::WebP),
            PathBuf::from("/photos/IMG_0001.webp")
        );
    }

    #[test]
    fn test_summary_counts() {
        let summary = ConversionSummary {
            outcomes: vec![
                FileOutcome {
                    source: "a.heic".into(),
                    result: Ok(Converted {
                        output: "a.jpg".into(),
                        deleted_original: false,
                    }),
                },
                FileOutcome {
                    source: "b.heic".into(),
                    result: Err(ConvertError::Config("bad".into())),
                },
            ],
        };
        assert_eq!(summary.converted(), 1);
        assert_eq!(summary.failed(), 1);
    }
}
