// tests/config_loading.rs

use std::fs;

use layerbuild::config::load_from_path;
use layerbuild::errors::LayerbuildError;
use layerbuild::layer::LayerId;
use tempfile::TempDir;

const ORIGINAL_LAYOUT: &str = r#"{
    "colors": {
        "red": "\u001b[31m",
        "green": "\u001b[32m",
        "default": "\u001b[0m"
    },
    "folders": {
        "development": "dev/",
        "production": "prod/",
        "validatorResults": "validator-results/",
        "layers": {
            "content": "content-layer/",
            "settings": "settings-layer/",
            "backend": "backend-layer/"
        }
    },
    "content_layer": {
        "views": { "main": "index.html" },
        "styles": { "source": "main.scss", "target": "main.css" },
        "controllers": { "main": "main.js" }
    },
    "settings_layer": {
        "views": { "main": "options.html" },
        "styles": { "source": "options.scss", "target": "options.css" },
        "controllers": { "main": "options.js" }
    },
    "backend_layer": {
        "controllers": { "main": "background.js" }
    }
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn expect_config_error(result: layerbuild::errors::Result<impl std::fmt::Debug>) -> String {
    match result {
        Err(LayerbuildError::ConfigLoad { reason, .. }) => reason,
        other => panic!("expected ConfigLoad, got {other:?}"),
    }
}

#[test]
fn loads_json_with_original_key_spelling() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.json", ORIGINAL_LAYOUT);

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.folders().validator_results, "validator-results/");
    assert_eq!(config.colors().red("x"), "\u{1b}[31mx\u{1b}[0m");
    assert!(config.layer(LayerId::Backend).unwrap().views.is_none());
    assert_eq!(config.tools().timeout_secs, 120);
    assert!(config.watch().use_hash);
}

#[test]
fn loads_toml_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "layers.toml",
        r#"
[colors]

[folders]
development = "src/"
production = "dist/"
validator_results = "reports/"

[folders.layers]
content = "content/"
settings = "settings/"
backend = "backend/"

[content_layer.controllers]
main = "main.js"

[settings_layer.controllers]
main = "main.js"

[backend_layer.controllers]
main = "worker.js"

[tools]
js_linter = "eslint --max-warnings 0 {source}"
timeout_secs = 0

[watch]
use_hash = false
"#,
    );

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.folders().development, "src/");
    assert_eq!(config.tools().js_linter, "eslint --max-warnings 0 {source}");
    assert_eq!(config.tools().timeout_secs, 0);
    assert!(!config.watch().use_hash);
}

#[test]
fn missing_required_key_is_reported() {
    let dir = TempDir::new().unwrap();
    let without_backend = ORIGINAL_LAYOUT.replace(
        r#""controllers": { "main": "background.js" }"#,
        r#""views": { "main": "background.html" }"#,
    );
    assert_ne!(without_backend, ORIGINAL_LAYOUT);
    let path = write(&dir, "config.json", &without_backend);

    let reason = expect_config_error(load_from_path(&path));
    assert!(reason.contains("controllers"), "{reason}");
}

#[test]
fn missing_colors_section_is_reported() {
    let dir = TempDir::new().unwrap();
    let start = ORIGINAL_LAYOUT.find("\"colors\"").unwrap();
    let end = ORIGINAL_LAYOUT.find("\"folders\"").unwrap();
    let without_colors = format!("{}{}", &ORIGINAL_LAYOUT[..start], &ORIGINAL_LAYOUT[end..]);
    assert!(!without_colors.contains("colors"));
    let path = write(&dir, "config.json", &without_colors);

    let reason = expect_config_error(load_from_path(&path));
    assert!(reason.contains("missing field `colors`"), "{reason}");
}

#[test]
fn malformed_document_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.json", "{ \"colors\": ");

    let reason = expect_config_error(load_from_path(&path));
    assert!(reason.contains("invalid JSON"), "{reason}");
}

#[test]
fn absolute_layer_fragment_is_rejected() {
    let dir = TempDir::new().unwrap();
    let layout = ORIGINAL_LAYOUT.replace("\"content-layer/\"", "\"/content-layer/\"");
    let path = write(&dir, "config.json", &layout);

    let reason = expect_config_error(load_from_path(&path));
    assert!(reason.contains("folders.layers.content"), "{reason}");
}

#[test]
fn unknown_template_placeholder_is_rejected() {
    let dir = TempDir::new().unwrap();
    let layout = ORIGINAL_LAYOUT.replacen(
        "\"colors\": {",
        "\"tools\": { \"html_validator\": \"tidy {source} {output}\" },\n    \"colors\": {",
        1,
    );
    let path = write(&dir, "config.json", &layout);

    let reason = expect_config_error(load_from_path(&path));
    assert!(reason.contains("tools.html_validator"), "{reason}");
}
