//! The frontend driver: discovery, parallel parsing, module merge and resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use marlin_compiler::{Bindings, Resolution, Resolver};
use marlin_core::{Diagnostics, ResultCode};
use marlin_parser::ast::{CompilationUnit, FileId, ParsedUnit, Parser};
use marlin_parser::tokenize;
use marlin_registry::{ScopeId, ScopeTree};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::config::FrontendConfig;
use crate::error::{FrontendError, FrontendResult};

/// One source file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn read(path: impl Into<PathBuf>) -> FrontendResult<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|e| FrontendError::io(&path, e))?;
        Ok(Self { path, text })
    }
}

/// The analyzed program.
#[derive(Debug)]
pub struct Analysis {
    /// One unit per module, in order of first appearance.
    pub units: Vec<CompilationUnit>,
    pub scopes: ScopeTree,
    pub root: ScopeId,
    pub bindings: Bindings,
    /// Parse diagnostics file by file, then resolver diagnostics.
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn result_code(&self) -> ResultCode {
        ResultCode::from_diagnostics(&self.diagnostics)
    }

    /// The merged unit of a module.
    pub fn unit(&self, module_name: &str) -> Option<&CompilationUnit> {
        self.units.iter().find(|u| u.module_name == module_name)
    }
}

/// Runs tokenizer, parser and resolver over a whole program.
///
/// ```
/// use marlin::{Frontend, FrontendConfig, SourceFile};
/// use marlin_core::ResultCode;
///
/// let stdlib = concat!(env!("CARGO_MANIFEST_DIR"), "/test_scripts/std");
/// let frontend = Frontend::new(FrontendConfig::new().with_stdlib(stdlib));
/// let analysis = frontend
///     .analyze_sources(vec![SourceFile::new(
///         "main.mn",
///         "module app; public class Program { public static void Main() { } }",
///     )])
///     .unwrap();
/// assert_eq!(analysis.result_code(), ResultCode::Success);
/// assert!(analysis.unit("app").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Frontend {
    config: FrontendConfig,
}

impl Frontend {
    pub fn new(config: FrontendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// Analyze every source file below `path` together with the standard library.
    pub fn analyze_directory(&self, path: impl AsRef<Path>) -> FrontendResult<Analysis> {
        let stdlib = self.stdlib_sources()?;
        let mut files = self.discover(path.as_ref())?;
        info!(files = files.len(), path = %path.as_ref().display(), "sources discovered");

        let mut sources = stdlib;
        sources.reserve(files.len());
        for file in files.drain(..) {
            sources.push(SourceFile::read(file)?);
        }
        self.analyze(sources)
    }

    /// Analyze in-memory sources together with the standard library.
    pub fn analyze_sources(&self, files: Vec<SourceFile>) -> FrontendResult<Analysis> {
        let mut sources = self.stdlib_sources()?;
        sources.extend(files);
        self.analyze(sources)
    }

    /// Standard library sources. Every run requires them.
    fn stdlib_sources(&self) -> FrontendResult<Vec<SourceFile>> {
        let stdlib = self.config.stdlib_dir();
        if !stdlib.is_dir() {
            return Err(FrontendError::MissingStandardLibrary { path: stdlib });
        }
        let files = self.discover(&stdlib)?;
        debug!(files = files.len(), "standard library discovered");
        files.into_iter().map(SourceFile::read).collect()
    }

    /// Source files below `path`, sorted. A file path is returned as is.
    fn discover(&self, path: &Path) -> FrontendResult<Vec<PathBuf>> {
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }
        let mut found = Vec::new();
        let mut pending = vec![path.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let entries = fs::read_dir(&dir).map_err(|e| FrontendError::io(&dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| FrontendError::io(&dir, e))?;
                let entry_path = entry.path();
                if entry_path.is_dir() {
                    pending.push(entry_path);
                } else if self.config.is_source_file(&entry_path) {
                    found.push(entry_path);
                }
            }
        }
        found.sort();
        Ok(found)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn analyze(&self, sources: Vec<SourceFile>) -> FrontendResult<Analysis> {
        let parsed = {
            #[cfg(feature = "profiling")]
            profiling::scope!("parse");
            self.parse_all(&sources)
        };

        let mut diagnostics = Diagnostics::new();
        let mut units = Vec::with_capacity(parsed.len());
        for result in parsed {
            diagnostics.extend(result.diagnostics);
            units.extend(result.unit);
        }

        let units = merge_by_module(units);
        info!(modules = units.len(), "modules merged");

        let Resolution {
            scopes,
            root,
            bindings,
            diagnostics: resolver_diagnostics,
        } = {
            #[cfg(feature = "profiling")]
            profiling::scope!("resolve");
            Resolver::new().run(&units)?
        };
        diagnostics.extend(resolver_diagnostics);
        info!(
            diagnostics = diagnostics.len(),
            severe = diagnostics.severe_count(),
            "analysis finished"
        );

        Ok(Analysis {
            units,
            scopes,
            root,
            bindings,
            diagnostics,
        })
    }

    /// Tokenize and parse every file on a pool of scoped threads.
    ///
    /// Results come back in input order. File `i` gets `FileId(i)`.
    fn parse_all(&self, sources: &[SourceFile]) -> Vec<ParsedUnit> {
        let workers = self.config.worker_count().min(sources.len()).max(1);
        let next = AtomicUsize::new(0);
        let next = &next;

        let mut results: Vec<(usize, ParsedUnit)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(source) = sources.get(index) else {
                                break;
                            };
                            done.push((index, self.parse_file(source, FileId(index as u32))));
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, parsed)| parsed).collect()
    }

    fn parse_file(&self, source: &SourceFile, file: FileId) -> ParsedUnit {
        let path = source.path.to_string_lossy().into_owned();
        let stream = tokenize(&source.text, path.as_str());
        if stream.contains_invalid() {
            debug!(path = %path, "not parsed: invalid characters");
            return ParsedUnit {
                unit: None,
                diagnostics: stream.diagnostics,
            };
        }

        let mut diagnostics = stream.diagnostics;
        let parsed = Parser::new(stream.tokens, file)
            .with_max_errors(self.config.max_parse_errors)
            .parse();
        diagnostics.extend(parsed.diagnostics);
        debug!(path = %path, diagnostics = diagnostics.len(), "file parsed");

        ParsedUnit {
            unit: parsed.unit,
            diagnostics,
        }
    }
}

/// Concatenate units that share a module name, keeping first-appearance order.
pub fn merge_by_module(units: Vec<CompilationUnit>) -> Vec<CompilationUnit> {
    let mut merged: Vec<CompilationUnit> = Vec::new();
    let mut positions: FxHashMap<String, usize> = FxHashMap::default();

    for unit in units {
        match positions.get(&unit.module_name) {
            Some(&position) => {
                let target = &mut merged[position];
                for dependency in unit.dependencies {
                    if !target.dependencies.iter().any(|d| d.name == dependency.name) {
                        target.dependencies.push(dependency);
                    }
                }
                target.types.extend(unit.types);
            }
            None => {
                positions.insert(unit.module_name.clone(), merged.len());
                merged.push(unit);
            }
        }
    }
    merged
}
