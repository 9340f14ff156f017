//! Backend driving the Python `ultralytics` package.
//!
//! Each operation runs a short script in a child interpreter. Results come
//! back on stdout as a single line prefixed with [`RESULT_TAG`]; anything
//! else the library prints is ignored.
//!
//! Scripts do not share an interpreter, so the export script cannot reuse
//! the object the load script created. Instead the load script reports the
//! checkpoint file the identifier resolved to, and the export script loads
//! that same file.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{ExportBackend, ExportRequest};
use crate::models::config::PythonSettings;
use crate::{LabelMap, ModelHandle, PrepError, Result};

/// Prefix of the stdout line carrying the JSON result.
const RESULT_TAG: &str = "MODELPREP_RESULT ";

/// Lines of stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

const PROBE_SCRIPT: &str = "\
import importlib, sys
importlib.import_module(sys.argv[1])
";

const LOAD_SCRIPT: &str = "\
import importlib, json, sys
YOLO = importlib.import_module(sys.argv[1]).YOLO
model = YOLO(sys.argv[2])
names = {str(k): v for k, v in model.names.items()}
weights = getattr(model, 'ckpt_path', None)
result = {'names': names, 'weights': None if weights is None else str(weights)}
print('MODELPREP_RESULT ' + json.dumps(result), flush=True)
";

const EXPORT_SCRIPT: &str = "\
import importlib, json, sys
YOLO = importlib.import_module(sys.argv[1]).YOLO
model = YOLO(sys.argv[2])
path = model.export(format=sys.argv[3], imgsz=int(sys.argv[4]))
print('MODELPREP_RESULT ' + json.dumps(None if path is None else str(path)), flush=True)
";

/// Result line of the load script.
#[derive(Debug, Deserialize)]
struct LoadResult {
    names: LabelMap,
    #[serde(default)]
    weights: Option<String>,
}

/// Backend running `ultralytics` through a Python interpreter.
#[derive(Debug, Clone)]
pub struct UltralyticsBackend {
    interpreter: PathBuf,
    package: String,
    working_dir: Option<PathBuf>,
}

impl UltralyticsBackend {
    /// Create a backend using `python3` and the `ultralytics` package.
    pub fn new() -> Self {
        Self::from_settings(&PythonSettings::default())
    }

    /// Create a backend from configuration.
    pub fn from_settings(settings: &PythonSettings) -> Self {
        Self {
            interpreter: settings.interpreter.clone(),
            package: settings.package.clone(),
            working_dir: settings.working_dir.clone(),
        }
    }

    /// Set the interpreter executable.
    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Set the exporter's working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn run_script(&self, script: &str, args: &[&str]) -> std::io::Result<Output> {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-c").arg(script).args(args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        debug!(interpreter = %self.interpreter.display(), ?args, "Running python script");
        cmd.output()
    }

    fn handle_from(&self, model_id: &str, loaded: LoadResult) -> ModelHandle {
        info!("Loaded {} with {} classes", model_id, loaded.names.len());
        let handle = ModelHandle::new(model_id, loaded.names);
        match loaded.weights.filter(|w| !w.is_empty()) {
            Some(weights) => {
                let weights = self.resolve(PathBuf::from(weights));
                debug!("{} resolved to {}", model_id, weights.display());
                handle.with_weights(weights)
            }
            None => handle,
        }
    }

    /// Resolve a path reported by the interpreter against its working directory.
    fn resolve(&self, path: PathBuf) -> PathBuf {
        match &self.working_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }
}

impl Default for UltralyticsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportBackend for UltralyticsBackend {
    fn ensure_available(&self) -> Result<()> {
        let output = match self.run_script(PROBE_SCRIPT, &[&self.package]) {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Python interpreter {} not found", self.interpreter.display());
                return Err(PrepError::missing_package(&self.package));
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            debug!("Import probe failed: {}", stderr_tail(&output));
            return Err(PrepError::missing_package(&self.package));
        }

        info!("{} is importable", self.package);
        Ok(())
    }

    fn load(&self, model_id: &str) -> Result<ModelHandle> {
        let output = self
            .run_script(LOAD_SCRIPT, &[&self.package, model_id])
            .map_err(|e| PrepError::ModelLoad(e.to_string()))?;

        if !output.status.success() {
            return Err(PrepError::ModelLoad(format!(
                "{}: {}",
                model_id,
                stderr_tail(&output)
            )));
        }

        let loaded: LoadResult = parse_result(&String::from_utf8_lossy(&output.stdout))?;
        Ok(self.handle_from(model_id, loaded))
    }

    fn export(&self, model: &ModelHandle, request: &ExportRequest) -> Result<Option<PathBuf>> {
        let image_size = request.image_size.to_string();
        let output = self
            .run_script(
                EXPORT_SCRIPT,
                &[&self.package, &model.export_source(), &request.format, &image_size],
            )
            .map_err(|e| PrepError::Export(e.to_string()))?;

        if !output.status.success() {
            return Err(PrepError::Export(stderr_tail(&output)));
        }

        let path: Option<String> = parse_result(&String::from_utf8_lossy(&output.stdout))?;
        Ok(path
            .filter(|p| !p.is_empty())
            .map(|p| self.resolve(PathBuf::from(p))))
    }
}

/// Extract and decode the tagged result line from script stdout.
///
/// The last tagged line wins.
fn parse_result<T: DeserializeOwned>(stdout: &str) -> Result<T> {
    let payload = stdout
        .lines()
        .rev()
        .find_map(|line| line.trim_end().strip_prefix(RESULT_TAG))
        .ok_or_else(|| PrepError::InvalidResponse("no result line in output".to_string()))?;

    serde_json::from_str(payload).map_err(|e| PrepError::InvalidResponse(e.to_string()))
}

fn stderr_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    let tail = lines[start..].join("\n");
    if tail.is_empty() {
        format!("interpreter exited with {}", output.status)
    } else {
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_result_skips_library_chatter() {
        let stdout = "Ultralytics 8.1.0 Python-3.11\n\
                      MODELPREP_RESULT {\"0\": \"person\", \"29\": \"frisbee\"}\n";
        let names: LabelMap = parse_result(stdout).unwrap();
        assert_eq!(names.get(29), Some("frisbee"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_load_result_carries_resolved_weights() {
        let stdout = "MODELPREP_RESULT {\"names\": {\"29\": \"frisbee\"}, \"weights\": \"yolov8n.pt\"}\n";
        let loaded: LoadResult = parse_result(stdout).unwrap();

        let backend = UltralyticsBackend::new().with_working_dir("/work");
        let handle = backend.handle_from("yolov8n.pt", loaded);

        assert_eq!(handle.names.get(29), Some("frisbee"));
        assert_eq!(handle.weights, Some(PathBuf::from("/work/yolov8n.pt")));
        assert_eq!(handle.export_source(), "/work/yolov8n.pt");
    }

    #[test]
    fn test_load_result_without_weights_exports_by_id() {
        let loaded: LoadResult =
            parse_result("MODELPREP_RESULT {\"names\": {}, \"weights\": null}\n").unwrap();
        let handle = UltralyticsBackend::new().handle_from("yolov8n.pt", loaded);

        assert_eq!(handle.weights, None);
        assert_eq!(handle.export_source(), "yolov8n.pt");
    }

    #[test]
    fn test_parse_result_last_line_wins() {
        let stdout = "MODELPREP_RESULT \"first\"\nMODELPREP_RESULT \"second\"\n";
        let value: String = parse_result(stdout).unwrap();
        assert_eq!(value, "second");
    }

    #[test]
    fn test_parse_result_null_path() {
        let value: Option<String> = parse_result("MODELPREP_RESULT null\n").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_parse_result_missing_line() {
        let err = parse_result::<String>("nothing useful\n").unwrap_err();
        assert!(matches!(err, PrepError::InvalidResponse(_)));
    }

    #[test]
    fn test_missing_interpreter_is_missing_dependency() {
        let backend = UltralyticsBackend::new()
            .with_interpreter("/nonexistent/bin/python-modelprep-test");
        let err = backend.ensure_available().unwrap_err();
        match err {
            PrepError::MissingDependency { package, hint } => {
                assert_eq!(package, "ultralytics");
                assert_eq!(hint, "pip install ultralytics");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_relative_export_path() {
        let backend = UltralyticsBackend::new().with_working_dir("/work");
        assert_eq!(
            backend.resolve(PathBuf::from("yolov8n_saved_model")),
            PathBuf::from("/work/yolov8n_saved_model")
        );
        assert_eq!(
            backend.resolve(PathBuf::from("/abs/model.tflite")),
            PathBuf::from("/abs/model.tflite")
        );
    }
}
