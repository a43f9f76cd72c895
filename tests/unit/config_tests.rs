// Configuration loading and validation tests

use std::io::Write;

use tempfile::NamedTempFile;
use utsushi::config::*;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yaml.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = Config::from_yaml(
        r#"
origin:
  url: "http://content:9000"
"#,
    )
    .expect("Failed to parse minimal config");

    assert_eq!(config.server.address, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.request_timeout, 30);
    assert_eq!(config.server.log_format, LogFormat::Text);

    let images = &config.image_processing;
    assert!(images.enabled);
    assert!(images.process_media_library);
    assert!(images.process_content_item_assets);
    assert_eq!(images.media_library_prefix, "/getmedia");
    assert_eq!(images.content_item_asset_prefix, "/getContentAsset");
    assert_eq!(images.max_width, 5000);
    assert_eq!(images.max_height, 5000);
    assert_eq!(images.max_side_size, 5000);
    assert_eq!(images.quality, 80);
    assert!(config.validate().is_ok());
}

#[test]
fn test_full_config_from_file() {
    let file = write_config(
        r#"
server:
  address: "127.0.0.1"
  port: 18080
  request_timeout: 5
  log_format: json
origin:
  url: "http://content:9000/site"
image_processing:
  enabled: true
  process_media_library: false
  max_width: 1920
  quality: 65
"#,
    );

    let config = Config::from_file(file.path()).expect("Failed to load config file");

    assert_eq!(config.server.listen_addr(), "127.0.0.1:18080");
    assert_eq!(config.server.log_format, LogFormat::Json);
    assert_eq!(config.origin.url, "http://content:9000/site");
    assert!(!config.image_processing.process_media_library);
    assert_eq!(config.image_processing.max_width, 1920);
    assert_eq!(config.image_processing.max_height, 5000);
    assert_eq!(config.image_processing.quality, 65);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_config_file() {
    let result = Config::from_file("/nonexistent/utsushi.yaml");
    assert!(result
        .unwrap_err()
        .contains("Failed to read config file"));
}

#[test]
fn test_env_var_substitution() {
    std::env::set_var("UTSUSHI_TEST_ORIGIN_HOST", "cms.internal");
    let config = Config::from_yaml_with_env(
        r#"
origin:
  url: "http://${UTSUSHI_TEST_ORIGIN_HOST}:8000"
"#,
    )
    .unwrap();

    assert_eq!(config.origin.url, "http://cms.internal:8000");
}

#[test]
fn test_env_var_missing_is_an_error() {
    let result = Config::from_yaml_with_env(
        r#"
origin:
  url: "http://${UTSUSHI_TEST_SURELY_UNSET_VAR}"
"#,
    );

    assert!(result
        .unwrap_err()
        .contains("UTSUSHI_TEST_SURELY_UNSET_VAR"));
}

#[test]
fn test_origin_is_required() {
    assert!(Config::from_yaml("server:\n  port: 8080\n").is_err());
}

#[test]
fn test_validate_rejects_bad_values() {
    let cases = [
        ("origin:\n  url: \"\"\n", "empty"),
        ("origin:\n  url: \"https://secure:443\"\n", "http://"),
        ("origin:\n  url: \"content:9000\"\n", "origin.url"),
        (
            "server:\n  request_timeout: 0\norigin:\n  url: \"http://o\"\n",
            "request_timeout",
        ),
        (
            "origin:\n  url: \"http://o\"\nimage_processing:\n  quality: 0\n",
            "quality",
        ),
        (
            "origin:\n  url: \"http://o\"\nimage_processing:\n  max_side_size: 0\n",
            "max_side_size",
        ),
        (
            "origin:\n  url: \"http://o\"\nimage_processing:\n  media_library_prefix: getmedia\n",
            "media_library_prefix",
        ),
    ];

    for (yaml, expected) in cases {
        let config = Config::from_yaml(yaml).expect("YAML should parse");
        let err = config.validate().expect_err(yaml);
        assert!(
            err.contains(expected),
            "error {:?} should mention {:?}",
            err,
            expected
        );
    }
}
