//! Host environment lookups consumed by the probes.
//!
//! Everything a probe needs to know about the machine it runs on (environment
//! variables, the operating system, what is on `PATH`) goes through the
//! [`HostEnv`] trait so probes can be exercised against a scripted host.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::process::find_executable;

/// Environment variable that overrides the detected OS name.
pub const OS_OVERRIDE_VAR: &str = "CCPROBE_OS";

/// Coarse operating system classification.
///
/// Uses the names build scripts conventionally match against, so macOS is
/// reported as `macosx` rather than Rust's `macos`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OsName(String);

impl OsName {
    /// Create an OS name from a tag, normalizing case.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim().to_ascii_lowercase();
        match name.as_str() {
            "macos" | "darwin" => OsName("macosx".to_string()),
            _ => OsName(name),
        }
    }

    /// Detect the OS this binary was built for.
    pub fn host() -> Self {
        OsName::new(std::env::consts::OS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_macosx(&self) -> bool {
        self.0 == "macosx"
    }

    pub fn is_linux(&self) -> bool {
        self.0 == "linux"
    }

    /// AIX tags come with version suffixes (`aix7`), so match by substring.
    pub fn is_aix(&self) -> bool {
        self.0.contains("aix")
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tool the probes need to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The C compiler (`CC`)
    CCompiler,
    /// The C++ compiler (`CXX`)
    CxxCompiler,
    /// Any `make` (`MAKE`)
    Make,
}

impl Role {
    /// Environment variable that overrides this role's binary.
    pub fn env_var(&self) -> &'static str {
        match self {
            Role::CCompiler => "CC",
            Role::CxxCompiler => "CXX",
            Role::Make => "MAKE",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::CCompiler => "C compiler",
            Role::CxxCompiler => "C++ compiler",
            Role::Make => "make",
        }
    }
}

/// Default C compiler for an OS.
///
/// macOS ships clang as `cc`, and mixing it with a separately installed GCC
/// produces C++ link errors, so use the system alias there.
pub fn default_cc(os: &OsName) -> &'static str {
    if os.is_macosx() {
        "cc"
    } else {
        "gcc"
    }
}

/// Default C++ compiler for an OS.
pub fn default_cxx(os: &OsName) -> &'static str {
    if os.is_macosx() {
        "c++"
    } else {
        "g++"
    }
}

/// Lookups the probes make against the host.
pub trait HostEnv: Send + Sync {
    /// Read an environment variable. Unset and empty are both `None`.
    fn string_env(&self, name: &str) -> Option<String>;

    /// The current operating system.
    fn os_name(&self) -> OsName;

    /// Search `PATH` for an executable.
    fn find_command(&self, name: &str) -> Option<PathBuf>;

    /// Whether a regular file exists at `path`.
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Resolve the binary for a role.
    ///
    /// The role's environment variable wins. Compilers fall back to the OS
    /// default name; `make` falls back to a `PATH` search and may be absent.
    fn resolve_binary(&self, role: Role) -> Option<String> {
        if let Some(value) = self.string_env(role.env_var()) {
            return Some(value);
        }
        match role {
            Role::CCompiler => Some(default_cc(&self.os_name()).to_string()),
            Role::CxxCompiler => Some(default_cxx(&self.os_name()).to_string()),
            Role::Make => self
                .find_command("make")
                .map(|p| p.display().to_string()),
        }
    }
}

/// The real host: process environment, compile-time OS, and `which`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl HostEnv for SystemEnv {
    fn string_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn os_name(&self) -> OsName {
        match self.string_env(OS_OVERRIDE_VAR) {
            Some(os) => OsName::new(os),
            None => OsName::host(),
        }
    }

    fn find_command(&self, name: &str) -> Option<PathBuf> {
        find_executable(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockEnv;

    #[test]
    fn test_os_name_normalizes_macos() {
        assert_eq!(OsName::new("macos").as_str(), "macosx");
        assert_eq!(OsName::new("Darwin").as_str(), "macosx");
        assert!(OsName::new("aix7").is_aix());
        assert!(!OsName::new("linux").is_aix());
    }

    #[test]
    fn test_default_compilers_by_os() {
        assert_eq!(default_cc(&OsName::new("macosx")), "cc");
        assert_eq!(default_cxx(&OsName::new("macosx")), "c++");
        assert_eq!(default_cc(&OsName::new("linux")), "gcc");
        assert_eq!(default_cxx(&OsName::new("freebsd")), "g++");
    }

    #[test]
    fn test_resolve_binary_prefers_env() {
        let env = MockEnv::new("linux").with_var("CC", "clang-17");
        assert_eq!(env.resolve_binary(Role::CCompiler).as_deref(), Some("clang-17"));
        assert_eq!(env.resolve_binary(Role::CxxCompiler).as_deref(), Some("g++"));
    }

    #[test]
    fn test_resolve_make_from_path() {
        let env = MockEnv::new("linux");
        assert_eq!(env.resolve_binary(Role::Make), None);

        let env = env.with_command("make", "/usr/bin/make");
        assert_eq!(env.resolve_binary(Role::Make).as_deref(), Some("/usr/bin/make"));

        let env = env.with_var("MAKE", "bmake");
        assert_eq!(env.resolve_binary(Role::Make).as_deref(), Some("bmake"));
    }
}
