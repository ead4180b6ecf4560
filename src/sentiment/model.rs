// Model file locations.
//
// The classifier expects a three-class sequence classifier exported to ONNX
// (`model.onnx`) next to its HuggingFace `tokenizer.json`. Files live in a
// platform-appropriate directory (~/.local/share/sanctuary/models/ on Linux)
// unless SANCTUARY_MODEL_DIR points elsewhere.

use std::path::{Path, PathBuf};

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Returns the default directory for storing model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sanctuary")
        .join("models")
}

/// Check whether both required model files exist.
pub fn model_files_present(dir: &Path) -> bool {
    dir.join(MODEL_FILE).exists() && dir.join(TOKENIZER_FILE).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_ends_with_app_path() {
        let dir = default_model_dir();
        assert!(dir.ends_with("sanctuary/models"));
    }

    #[test]
    fn test_missing_files_detected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!model_files_present(dir.path()));
        std::fs::write(dir.path().join(MODEL_FILE), b"x").unwrap();
        assert!(!model_files_present(dir.path()));
        std::fs::write(dir.path().join(TOKENIZER_FILE), b"{}").unwrap();
        assert!(model_files_present(dir.path()));
    }
}
