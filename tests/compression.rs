use image::{Rgb, RgbImage};
use pca_compress::{
    CompressionConfig, Compressor,
    error::CompressionError,
    metrics::{QualityMetrics, mean_squared_error, peak_signal_to_noise_ratio},
    pca_compression,
    report::{JsonReport, visualization::Visualizer},
};
use tempfile::TempDir;

fn textured(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 37 + y * 11) % 256) as u8,
            ((x * x + 3 * y) % 256) as u8,
            ((x * y * 5 + 40) % 256) as u8,
        ])
    })
}

fn write_png(dir: &TempDir, name: &str, image: &RgbImage) -> std::path::PathBuf {
    let path = dir.path().join(name);
    image.save(&path).unwrap();
    path
}

#[test]
fn gray_image_reconstructs_exactly() {
    let dir = TempDir::new().unwrap();
    let gray = RgbImage::from_pixel(4, 4, Rgb([128, 128, 128]));
    let path = write_png(&dir, "gray.png", &gray);

    let (original, reconstructed) = pca_compression(&path, 1).unwrap();

    assert_eq!(original, gray);
    assert_eq!(reconstructed, gray);
    assert_eq!(mean_squared_error(&original, &reconstructed).unwrap(), 0.0);
    assert!(peak_signal_to_noise_ratio(&original, &reconstructed).unwrap().is_infinite());
}

#[test]
fn shape_is_preserved_for_every_component_count() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "textured.png", &textured(23, 11));

    for n in 1..=3 {
        let (original, reconstructed) = pca_compression(&path, n).unwrap();
        assert_eq!(original.dimensions(), (23, 11));
        assert_eq!(reconstructed.dimensions(), original.dimensions());
    }
}

#[test]
fn full_rank_is_identity() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "textured.png", &textured(40, 30));

    let (original, reconstructed) = pca_compression(&path, 3).unwrap();
    let metrics = QualityMetrics::compute(&original, &reconstructed).unwrap();

    // Only the float-to-u8 truncation can lose anything at full rank.
    assert!(metrics.mse <= 1.0);
    assert!(metrics.psnr >= 10.0 * (255.0f64 * 255.0).log10());
}

#[test]
fn quality_improves_with_more_components() {
    let compressor = Compressor::from_image(textured(64, 48).into());

    let metrics = (1..=3)
        .map(|n| compressor.compress_with(n).unwrap().metrics().unwrap())
        .collect::<Vec<_>>();

    assert!(metrics[0].mse >= metrics[1].mse);
    assert!(metrics[1].mse >= metrics[2].mse);
    assert!(metrics[0].psnr <= metrics[1].psnr);
    assert!(metrics[0].mse > 0.0);
}

#[test]
fn repeated_runs_are_identical() {
    let compressor = Compressor::from_image(textured(50, 50).into());

    for n in 1..=3 {
        let first = compressor.compress_with(n).unwrap();
        let second = compressor.compress_with(n).unwrap();
        assert_eq!(first.reconstructed, second.reconstructed);
        assert_eq!(first.model.components(), second.model.components());
    }
}

#[test]
fn component_count_is_validated() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "textured.png", &textured(8, 8));

    for n in [0, 4] {
        assert!(matches!(
            pca_compression(&path, n),
            Err(CompressionError::InvalidComponents { max: 3, .. })
        ));
    }
    for n in 1..=3 {
        assert!(pca_compression(&path, n).is_ok());
    }
}

#[test]
fn unreadable_input_is_decode_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.png");
    let garbage = dir.path().join("garbage.png");
    std::fs::write(&garbage, b"definitely not a png").unwrap();

    assert!(matches!(pca_compression(&missing, 1), Err(CompressionError::ImageLoad(_))));
    assert!(matches!(pca_compression(&garbage, 1), Err(CompressionError::ImageLoad(_))));
}

#[test]
fn config_file_drives_full_run() {
    let dir = TempDir::new().unwrap();
    let input = write_png(&dir, "input.png", &textured(32, 16));
    let config = CompressionConfig {
        image_path: input.clone(),
        n_components: 2,
        output_path: dir.path().join("compressed_output.jpg"),
        figure_path: dir.path().join("comparison.png"),
        report_path: Some(dir.path().join("report.json")),
    };
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();

    let loaded = CompressionConfig::from_json_file(&config_path).unwrap();
    assert_eq!(loaded, config);

    let result = Compressor::from_config(loaded).unwrap().compress().unwrap();
    result.save(&config.output_path).unwrap();
    Visualizer::new().save_comparison(&result, &config.figure_path).unwrap();

    let metrics = result.metrics().unwrap();
    let report_path = config.report_path.as_ref().unwrap();
    JsonReport::new(&result, &metrics)
        .with_image_path(&input)
        .save(report_path)
        .unwrap();

    let saved = image::open(&config.output_path).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (32, 16));

    let figure = image::open(&config.figure_path).unwrap().to_rgb8();
    assert!(figure.width() > 64 && figure.height() > 16);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["n_components"], 2);
    assert_eq!(report["width"], 32);
}

#[test]
fn invalid_config_rejected_before_loading() {
    let config = CompressionConfig {
        image_path: "never/read.png".into(),
        n_components: 5,
        ..Default::default()
    };

    assert!(matches!(
        Compressor::from_config(config),
        Err(CompressionError::InvalidComponents { requested: 5, max: 3 })
    ));
}

#[test]
fn malformed_config_is_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ n_components: ").unwrap();

    assert!(matches!(
        CompressionConfig::from_json_file(&path),
        Err(CompressionError::Json(_))
    ));
}
