//! Source languages a probe can be written in.
//!
//! Each language maps to the compiler role that builds it, the extension of
//! the generated source file, and the environment variables that inject
//! extra flags into every probe command.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::platform::Role;
use crate::probe::ProbeError;

/// Extra flags placed in front of everything else when linking.
pub const EXTRA_PRE_LDFLAGS: &str = "EXTRA_PRE_LDFLAGS";

/// Extra flags appended to every command, compile or link.
pub const EXTRA_LDFLAGS: &str = "EXTRA_LDFLAGS";

/// Source language for a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C language (default)
    #[default]
    C,
    /// C++ language
    #[serde(alias = "cpp", alias = "cxx", alias = "c++")]
    Cxx,
}

impl Language {
    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }

    /// Extension used for generated source files.
    pub fn extension(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "cpp",
        }
    }

    /// The compiler role that builds this language.
    pub fn compiler_role(&self) -> Role {
        match self {
            Language::C => Role::CCompiler,
            Language::Cxx => Role::CxxCompiler,
        }
    }

    /// Variable whose flags go right after the compiler (and pre-link flags).
    pub fn pre_flags_var(&self) -> &'static str {
        match self {
            Language::C => "EXTRA_PRE_CFLAGS",
            Language::Cxx => "EXTRA_PRE_CXXFLAGS",
        }
    }

    /// Variable whose flags go after the caller's flags.
    pub fn flags_var(&self) -> &'static str {
        match self {
            Language::C => "EXTRA_CFLAGS",
            Language::Cxx => "EXTRA_CXXFLAGS",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" => Ok(Language::C),
            "c++" | "cxx" | "cpp" => Ok(Language::Cxx),
            _ => Err(ProbeError::UnsupportedLanguage(s.to_string())),
        }
    }
}
