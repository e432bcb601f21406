//! Frontend configuration.

use std::env;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use marlin_parser::ast::DEFAULT_MAX_PARSE_ERRORS;

/// File extension of Marlin sources.
pub const DEFAULT_EXTENSION: &str = "mn";

/// Environment variable naming the standard library directory.
pub const STDLIB_ENV: &str = "MARLIN_STDLIB";

/// Name of the standard library directory looked up beside the executable.
pub const STDLIB_DIR_NAME: &str = "std";

/// Settings for a [`Frontend`](crate::Frontend) run.
///
/// ```
/// use marlin::FrontendConfig;
///
/// let config = FrontendConfig::new()
///     .with_stdlib("lib/std")
///     .with_worker_threads(2);
/// assert_eq!(config.worker_count(), 2);
/// assert_eq!(config.extension, "mn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    /// Directory whose sources are analyzed with every program.
    /// `None` falls back to [`FrontendConfig::stdlib_dir`]'s lookup.
    pub stdlib_path: Option<PathBuf>,
    /// Extension, without the dot, of files picked up from directories.
    pub extension: String,
    /// Severe diagnostics a file may produce before parsing is cancelled.
    pub max_parse_errors: usize,
    /// Parser threads; `None` uses the available parallelism.
    pub worker_threads: Option<usize>,
}

impl FrontendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdlib(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdlib_path = Some(path.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_max_parse_errors(mut self, max_parse_errors: usize) -> Self {
        self.max_parse_errors = max_parse_errors;
        self
    }

    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = Some(workers);
        self
    }

    /// Number of parser threads to start, at least one.
    pub fn worker_count(&self) -> usize {
        match self.worker_threads {
            Some(workers) => workers.max(1),
            None => thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }

    /// Standard library directory: the configured one, else `$MARLIN_STDLIB`,
    /// else `std` beside the running executable.
    ///
    /// The directory is not checked for existence here.
    pub fn stdlib_dir(&self) -> PathBuf {
        if let Some(path) = &self.stdlib_path {
            return path.clone();
        }
        if let Some(path) = env::var_os(STDLIB_ENV) {
            return PathBuf::from(path);
        }
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(STDLIB_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(STDLIB_DIR_NAME))
    }

    /// Whether `path` names a source file by its extension.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == self.extension.as_str())
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            stdlib_path: None,
            extension: DEFAULT_EXTENSION.to_string(),
            max_parse_errors: DEFAULT_MAX_PARSE_ERRORS,
            worker_threads: None,
        }
    }
}
