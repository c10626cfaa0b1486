// Configuration tests: YAML loading, environment substitution, validation.

use std::io::Write;
use textmark::config::RenderConfig;
use textmark::encoder::OutputFormat;
use textmark::logging::LogFormat;
use textmark::watermark::Color;
use textmark::Error;

#[test]
fn test_full_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r##"
font: /tmp/some-font.ttf
antialias: true
color: "#f00"
background: "#ffffff"
pdf_dpi: 300
portrait_threshold: 1.2
landscape_threshold: 0.8
format: tiff
rotate: ldiag
orientation: landscape
log_format: json
log_file: /tmp/textmark.log
"##
    )
    .unwrap();

    let config = RenderConfig::from_file(file.path()).unwrap();
    assert!(config.antialias);
    assert_eq!(config.text_color().unwrap(), Color::new(255, 0, 0));
    assert_eq!(config.background_color().unwrap(), Some(Color::white()));
    assert_eq!(config.pdf_dpi, 300);
    assert_eq!(config.format, OutputFormat::Tiff);
    assert_eq!(config.rotate, "ldiag");
    assert_eq!(config.orientation, "landscape");
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.thresholds().portrait, 1.2);
    assert_eq!(config.thresholds().landscape, 0.8);
    assert!(config.validate().is_ok());
}

#[test]
fn test_env_substitution() {
    std::env::set_var("TEXTMARK_TEST_COLOR", "#00ff00");
    let config = RenderConfig::from_yaml_with_env("color: \"${TEXTMARK_TEST_COLOR}\"\n").unwrap();
    assert_eq!(config.text_color().unwrap(), Color::new(0, 255, 0));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RenderConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_malformed_yaml_is_config_error() {
    let err = RenderConfig::from_yaml_with_env("pdf_dpi: [not, a, number]\n").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_validate_rejects_non_positive_threshold() {
    let config = RenderConfig {
        landscape_threshold: 0.0,
        ..RenderConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn test_validate_rejects_bad_background() {
    let config = RenderConfig {
        background: Some("#12".to_string()),
        ..RenderConfig::default()
    };
    assert!(config.validate().is_err());
}
