//! Scoped temporary sources and their build by-products.
//!
//! Configuration runs can issue hundreds of probes, so nothing a probe
//! writes may outlive the probe: the source file, the object or executable
//! produced from it, and the run directory are all removed on drop.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{TempDir, TempPath};

use crate::core::language::Language;

/// A generated source file owned by one probe.
#[derive(Debug)]
pub struct TransientSource {
    path: PathBuf,
    by_products: Vec<PathBuf>,
    // Removes the source itself when dropped.
    _source: TempPath,
}

impl TransientSource {
    /// Path of the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register `<source><suffix>` for removal and return it.
    pub fn by_product(&mut self, suffix: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(suffix);
        let path = PathBuf::from(name);
        self.register(path.clone());
        path
    }

    /// Register an arbitrary path for removal.
    pub fn register(&mut self, path: PathBuf) {
        self.by_products.push(path);
    }
}

impl Drop for TransientSource {
    fn drop(&mut self) {
        for path in &self.by_products {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::debug!("failed to remove {}: {}", path.display(), e);
                }
            }
        }
    }
}

/// Write `text` to a fresh `<prefix>XXXXXX.<ext>` file in `dir` and run `body`.
///
/// The file handle is closed before `body` runs so the compiler can open it
/// on every platform. The source and everything `body` registers is removed
/// when this returns, including when `body` panics.
pub fn with_temp_source<T>(
    dir: &Path,
    prefix: &str,
    language: Language,
    text: &str,
    body: impl FnOnce(&mut TransientSource) -> T,
) -> io::Result<T> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(&format!(".{}", language.extension()))
        .tempfile_in(dir)?;
    writeln!(file, "{}", text)?;

    let temp_path = file.into_temp_path();
    let mut source = TransientSource {
        path: temp_path.to_path_buf(),
        by_products: Vec::new(),
        _source: temp_path,
    };
    Ok(body(&mut source))
}

/// A private directory for probe executables.
///
/// Some systems mount the shared temp directory `noexec`, so executables
/// go in their own directory under a configurable root instead of next to
/// the source.
#[derive(Debug)]
pub struct RunSandbox {
    dir: TempDir,
}

impl RunSandbox {
    /// Create a uniquely named sandbox under `root`.
    pub fn create(root: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("ccprobe-run-")
            .tempdir_in(root)?;
        Ok(RunSandbox { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Executable path for a source file: `<sandbox>/<source name>.out`.
    pub fn executable_for(&self, source: &Path) -> PathBuf {
        let mut name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "probe".into());
        name.push(".out");
        self.dir.path().join(name)
    }
}
