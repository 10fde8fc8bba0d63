use heic_convert::*;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Stand-in decoder: the `.heic` fixtures hold PNG bytes
struct PngFixtureDecoder;

impl HeicDecoder for PngFixtureDecoder {
    fn decode(&self, path: &Path) -> heic_convert::Result<image::DynamicImage> {
        if path.file_stem().is_some_and(|stem| stem == "boom") {
            panic!("codec exploded");
        }
        image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| ConvertError::Decode {
                path: path.to_owned(),
                reason: e.to_string(),
            })
    }
}

fn write_fixture(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(8, 6, Rgb([10, 200, 30]))
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

fn options_for(dir: &Path) -> ConvertOptions {
    ConvertOptions {
        input_dir: dir.to_owned(),
        ..Default::default()
    }
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_find_heic_files_sorted_and_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.HEIC", "a.heic", "c.heif", "notes.txt", "d.jpg"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    std::fs::create_dir(dir.path().join("nested.heic")).unwrap();

    let files = find_heic_files(dir.path()).await.unwrap();
    let found: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(found, vec!["a.heic", "b.HEIC", "c.heif"]);
}

#[tokio::test]
async fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let result = convert_directory(
        &options_for(&dir.path().join("missing")),
        Arc::new(PngFixtureDecoder),
        |_| {},
    )
    .await;
    assert!(matches!(result, Err(ConvertError::DirectoryNotFound { .. })));
}

#[tokio::test]
async fn test_no_heic_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("photo.jpg"), b"x").unwrap();

    let summary = convert_directory(&options_for(dir.path()), Arc::new(PngFixtureDecoder), |_| {})
        .await
        .unwrap();
    assert!(summary.outcomes.is_empty());
}

#[tokio::test]
async fn test_converts_to_jpeg_and_keeps_originals() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a.heic");
    write_fixture(dir.path(), "b.HEIC");

    let mut reported = Vec::new();
    let summary = convert_directory(&options_for(dir.path()), Arc::new(PngFixtureDecoder), |o| {
        reported.push(o.source.clone())
    })
    .await
    .unwrap();

    assert_eq!(summary.converted(), 2);
    assert_eq!(summary.failed(), 0);
    assert_eq!(reported.len(), 2);
    assert_eq!(names(dir.path()), vec!["a.heic", "a.jpg", "b.HEIC", "b.jpg"]);

    let reader = image::ImageReader::open(dir.path().join("a.jpg"))
        .unwrap()
        .with_guessed_format()
        .unwrap();
    assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
    assert_eq!(reader.into_dimensions().unwrap(), (8, 6));
}

#[tokio::test]
async fn test_delete_original_after_conversion() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a.heic");

    let options = ConvertOptions {
        format: OutputFormat::Png,
        delete_original: true,
        ..options_for(dir.path())
    };
    let summary = convert_directory(&options, Arc::new(PngFixtureDecoder), |_| {})
        .await
        .unwrap();

    let converted = summary.outcomes[0].result.as_ref().unwrap();
    assert!(converted.deleted_original);
    assert_eq!(converted.output, dir.path().join("a.png"));
    assert_eq!(names(dir.path()), vec!["a.png"]);
}

#[tokio::test]
async fn test_failed_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a.heic");
    std::fs::write(dir.path().join("broken.heic"), b"not an image").unwrap();
    write_fixture(dir.path(), "c.heic");

    let options = ConvertOptions {
        delete_original: true,
        ..options_for(dir.path())
    };
    let summary = convert_directory(&options, Arc::new(PngFixtureDecoder), |_| {})
        .await
        .unwrap();

    assert_eq!(summary.converted(), 2);
    assert_eq!(summary.failed(), 1);
    let failed = summary.outcomes.iter().find(|o| o.result.is_err()).unwrap();
    assert_eq!(failed.source, dir.path().join("broken.heic"));
    // Failed sources are never deleted
    assert_eq!(names(dir.path()), vec!["a.jpg", "broken.heic", "c.jpg"]);
}

#[tokio::test]
async fn test_decoder_panic_is_a_failed_file() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a.heic");
    write_fixture(dir.path(), "boom.heic");

    let summary = convert_directory(&options_for(dir.path()), Arc::new(PngFixtureDecoder), |_| {})
        .await
        .unwrap();

    assert_eq!(summary.converted(), 1);
    let failed = summary.outcomes.iter().find(|o| o.result.is_err()).unwrap();
    assert_eq!(failed.source, dir.path().join("boom.heic"));
    match &failed.result {
        Err(ConvertError::Decode { reason, .. }) => assert!(reason.contains("codec exploded")),
        other => panic!("Expected Decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sequential_reports_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["c.heic", "a.heic", "b.heic"] {
        write_fixture(dir.path(), name);
    }

    let options = ConvertOptions {
        format: OutputFormat::WebP,
        parallel: false,
        ..options_for(dir.path())
    };
    let mut reported = Vec::new();
    convert_directory(&options, Arc::new(PngFixtureDecoder), |o| {
        reported.push(o.source.file_name().unwrap().to_string_lossy().into_owned())
    })
    .await
    .unwrap();

    assert_eq!(reported, vec!["a.heic", "b.heic", "c.heic"]);
    let reader = image::ImageReader::open(dir.path().join("a.webp"))
        .unwrap()
        .with_guessed_format()
        .unwrap();
    assert_eq!(reader.format(), Some(ImageFormat::WebP));
}

#[test]
fn test_read_only_output_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(dir.path(), "a.heic");
    let output = dir.path().join("a.jpg");
    std::fs::write(&output, b"PROTECTED").unwrap();
    let mut permissions = std::fs::metadata(&output).unwrap().permissions();
    permissions.set_readonly(true);
    std::fs::set_permissions(&output, permissions).unwrap();

    let result = convert_file(&PngFixtureDecoder, &source, OutputFormat::Jpeg, true);
    assert!(matches!(result, Err(ConvertError::Io(_))));
    assert_eq!(std::fs::read(&output).unwrap(), b"PROTECTED");
    assert!(source.exists());
}
