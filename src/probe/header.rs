//! Locating headers through the compiler's include search path.
//!
//! Compilers do not report where a header was found, but GCC and Clang list
//! their include search path when compiling with `-v`:
//!
//! ```text
//! #include <...> search starts here:
//!  /usr/lib/gcc/x86_64-linux-gnu/12/include
//!  /usr/local/include
//!  /usr/include
//! End of search list.
//! ```
//!
//! A compile that succeeds proves the header exists; scanning the listed
//! directories in order recovers its path. Toolchains that phrase the listing
//! differently still answer "present", just without a path.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::language::Language;

use super::checks::ProbeRequest;
use super::executor::{ExecMode, ProbeOutcome};
use super::Prober;

static SEARCH_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^#include <\.\.\.> search starts here:\r?$(.*?)^End of search list\.\r?$")
        .expect("search list pattern is valid")
});

/// Where a header was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum HeaderLocation {
    /// The header compiles and lives at this path.
    Found(PathBuf),
    /// The header compiles, but no listed search directory contains it.
    PresentPathUnknown,
    /// The header does not compile (or the compiler could not be run).
    NotFound,
}

impl HeaderLocation {
    /// Whether the header is known to exist.
    pub fn is_present(&self) -> bool {
        !matches!(self, HeaderLocation::NotFound)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            HeaderLocation::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Extract the `#include <...>` search directories from verbose compiler output.
///
/// Returns an empty list when the block is missing.
pub fn parse_search_paths(output: &str) -> Vec<PathBuf> {
    let Some(captures) = SEARCH_LIST.captures(output) else {
        return Vec::new();
    };

    captures
        .get(1)
        .map(|block| block.as_str())
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// First directory, in listed order, that contains `name` as a regular file.
pub fn locate_in_search_paths(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

impl Prober {
    /// Find a header the way the compiler would.
    pub fn find_header(&self, name: &str, language: Language, flags: Option<&str>) -> HeaderLocation {
        let request = ProbeRequest::compile(
            format!("Checking for {}", name),
            language,
            format!("#include <{}>", name),
        )
        .with_driver_flags("-v")
        .with_flags(flags);

        match self.run_request(&request, ExecMode::Capture) {
            ProbeOutcome::Success { output } => {
                let dirs = parse_search_paths(output.as_deref().unwrap_or_default());
                match locate_in_search_paths(&dirs, name) {
                    Some(path) => HeaderLocation::Found(path),
                    None => {
                        tracing::debug!(
                            "{} compiles but is not in any of {} listed search directories",
                            name,
                            dirs.len()
                        );
                        HeaderLocation::PresentPathUnknown
                    }
                }
            }
            ProbeOutcome::Failure { .. } | ProbeOutcome::ExecutionError { .. } => {
                HeaderLocation::NotFound
            }
        }
    }
}
