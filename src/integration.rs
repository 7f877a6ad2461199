use std::path::{Path, PathBuf};

/// The parts of a CI integration cycle the labeller reads from and writes to.
#[derive(Debug, Clone, Default)]
pub struct IntegrationResult {
    /// Base directory relative working directories are resolved against.
    pub working_directory: PathBuf,
    pub label: Option<String>,
}

impl IntegrationResult {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            label: None,
        }
    }

    pub fn base_from_working_directory(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_directory.join(path)
        }
    }
}
