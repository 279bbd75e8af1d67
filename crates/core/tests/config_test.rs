//! Configuration loading through the public API.

use std::fs;
use std::path::PathBuf;

use engine_core::{Config, Error};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("engine_core_{}_{}", std::process::id(), name))
}

#[test]
fn test_load_reads_file_from_disk() {
    let path = temp_path("ok.toml");
    fs::write(
        &path,
        "[renderer]\nprefer_mailbox = false\nclear_color = [0.1, 0.2, 0.3, 1.0]\n\n[assets]\nmodels = [\"models/cube.obj\"]\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert!(!config.renderer.prefer_mailbox);
    assert_eq!(config.renderer.clear_color, [0.1, 0.2, 0.3, 1.0]);
    assert_eq!(config.assets.models, vec![PathBuf::from("models/cube.obj")]);
}

#[test]
fn test_load_rejects_broken_file() {
    let path = temp_path("broken.toml");
    fs::write(&path, "window = [").unwrap();

    let result = Config::load(&path);
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(Error::Config { .. })));
}
