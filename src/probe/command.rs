//! Compiler command line synthesis.

use std::path::Path;

use crate::core::language::{Language, EXTRA_LDFLAGS, EXTRA_PRE_LDFLAGS};
use crate::core::platform::{default_cc, default_cxx, HostEnv};

/// Build the command line for one probe.
///
/// The layout is fixed:
///
/// ```text
/// <compiler> [EXTRA_PRE_LDFLAGS] <pre-flags var> <flags1> <flags2> <flags var> EXTRA_LDFLAGS
/// ```
///
/// `EXTRA_PRE_LDFLAGS` only appears when `link` is set. Unset and blank
/// pieces are dropped rather than rendered as empty tokens.
pub fn synthesize(
    env: &dyn HostEnv,
    language: Language,
    flags1: &str,
    flags2: &str,
    link: bool,
) -> String {
    let compiler = compiler_for(env, language);
    let pre_link = if link {
        env.string_env(EXTRA_PRE_LDFLAGS)
    } else {
        None
    };

    let parts = [
        Some(compiler),
        pre_link,
        env.string_env(language.pre_flags_var()),
        Some(flags1.to_string()),
        Some(flags2.to_string()),
        env.string_env(language.flags_var()),
        env.string_env(EXTRA_LDFLAGS),
    ];

    parts
        .into_iter()
        .flatten()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// The compiler binary for a language.
pub fn compiler_for(env: &dyn HostEnv, language: Language) -> String {
    env.resolve_binary(language.compiler_role())
        .unwrap_or_else(|| {
            let os = env.os_name();
            match language {
                Language::C => default_cc(&os).to_string(),
                Language::Cxx => default_cxx(&os).to_string(),
            }
        })
}

/// Quote a path for interpolation into a command line.
pub fn quote_path(path: &Path) -> String {
    shell_words::quote(&path.display().to_string()).into_owned()
}

/// Flags that compile `source` to `<source>.o`.
pub fn compile_flags(source: &Path, object: &Path) -> String {
    format!("-c {} -o {}", quote_path(source), quote_path(object))
}

/// Flags that compile and link `source` to `output`.
pub fn link_flags(source: &Path, output: &Path) -> String {
    format!("{} -o {}", quote_path(source), quote_path(output))
}
