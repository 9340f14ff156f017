//! End-to-end tests for the `modelprep` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn modelprep() -> Command {
    Command::cargo_bin("modelprep").unwrap()
}

fn write_config(dir: &Path, interpreter: &Path) -> PathBuf {
    let config = serde_json::json!({
        "output": { "project_root": dir.join("app") },
        "python": {
            "interpreter": interpreter,
            "working_dir": dir,
        }
    });
    let path = dir.join("modelprep.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

#[test]
fn test_missing_dependency_exits_nonzero_with_hint() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), Path::new("/nonexistent/python-modelprep"));

    modelprep()
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ultralytics package not found."))
        .stdout(predicate::str::contains("pip install ultralytics"))
        .stdout(predicate::str::contains("[1/4]").not());

    assert!(!dir.path().join("app").exists());
}

#[test]
fn test_missing_config_file_fails() {
    modelprep()
        .args(["--config", "/nonexistent/modelprep.json", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_config_init_then_get() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/config.json");

    modelprep()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    modelprep()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    modelprep()
        .arg("--config")
        .arg(&path)
        .args(["config", "get", "labels.expected"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"frisbee\""));
}

#[test]
fn test_config_show_applies_project_root() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), Path::new("python3"));

    modelprep()
        .arg("--config")
        .arg(&config)
        .args(["--project-root", "/srv/mobile-app", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/mobile-app"))
        .stdout(predicate::str::contains("\"image_size\": 320"));
}

#[test]
fn test_check_reports_missing_dependency_without_failing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), Path::new("/nonexistent/python-modelprep"));

    modelprep()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ultralytics missing"))
        .stdout(predicate::str::contains("pip install ultralytics"));
}

#[cfg(unix)]
mod fake_python {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Stand-in interpreter dispatching on argument count:
    /// `-c <script> <package>` probes, `+ <model>` loads, `+ <format> <imgsz>` exports.
    /// Export fails unless it is handed the checkpoint the load step reported.
    fn install(dir: &Path, label_29: &str, export: &str) -> PathBuf {
        let script = format!(
            r#"#!/bin/sh
case "$#" in
  3) exit 0 ;;
  4) echo "Ultralytics YOLOv8 loading $4"
     echo 'MODELPREP_RESULT {{"names": {{"0": "person", "28": "suitcase", "29": "{label_29}"}}, "weights": "cache/yolov8n-resolved.pt"}}' ;;
  6) case "$4" in
       */cache/yolov8n-resolved.pt) ;;
       *) echo "exported unexpected model $4" >&2; exit 3 ;;
     esac
     {export} ;;
  *) exit 2 ;;
esac
"#
        );
        let path = dir.join("fake-python");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    const EXPORT_SAVED_MODEL: &str = "mkdir -p yolov8n_saved_model
     printf 'fake-tflite-weights' > yolov8n_saved_model/yolov8n_float32.tflite
     echo 'MODELPREP_RESULT \"yolov8n_saved_model\"'";

    #[test]
    fn test_convert_installs_artifact() {
        let dir = TempDir::new().unwrap();
        let python = install(dir.path(), "frisbee", EXPORT_SAVED_MODEL);
        let config = write_config(dir.path(), &python);

        modelprep()
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("YOLOv8n COCO to TFLite Converter"))
            .stdout(predicate::str::contains("[4/4]"))
            .stdout(predicate::str::contains("Class 'frisbee' found at index 29"))
            .stdout(predicate::str::contains("Warning").not())
            .stdout(predicate::str::contains("Conversion complete!"));

        let dest = dir.path().join("app/assets/ml/yolov8n_coco.tflite");
        assert_eq!(fs::read(&dest).unwrap(), b"fake-tflite-weights");
    }

    #[test]
    fn test_convert_warns_on_label_mismatch() {
        let dir = TempDir::new().unwrap();
        let python = install(dir.path(), "kite", EXPORT_SAVED_MODEL);
        let config = write_config(dir.path(), &python);

        modelprep()
            .arg("--config")
            .arg(&config)
            .arg("convert")
            .assert()
            .success()
            .stdout(predicate::str::contains("Warning: Expected 'frisbee' at index 29, got 'kite'"))
            .stdout(predicate::str::contains("    28: suitcase"));
    }

    #[test]
    fn test_convert_not_found_still_exits_zero() {
        let dir = TempDir::new().unwrap();
        let python = install(dir.path(), "frisbee", "echo 'MODELPREP_RESULT null'");
        let config = write_config(dir.path(), &python);

        modelprep()
            .arg("--config")
            .arg(&config)
            .assert()
            .code(0)
            .stdout(predicate::str::contains("Could not find generated TFLite file"))
            .stdout(predicate::str::contains("Export path was: None"));

        assert!(!dir.path().join("app/assets/ml").exists());
    }

    #[test]
    fn test_export_failure_exits_nonzero() {
        let dir = TempDir::new().unwrap();
        let python = install(dir.path(), "frisbee", "echo 'converter crashed' >&2; exit 1");
        let config = write_config(dir.path(), &python);

        modelprep()
            .arg("--config")
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("converter crashed"));
    }
}
