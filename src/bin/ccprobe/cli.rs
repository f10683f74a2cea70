//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use ccprobe::Language;

/// ccprobe - Probe a C/C++ toolchain for supported flags, headers, and libraries
#[derive(Parser)]
#[command(name = "ccprobe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether the compiler accepts a flag
    Flag(FlagArgs),

    /// Locate a header through the compiler's include search path
    Header(HeaderArgs),

    /// Check whether a source file compiles
    Compile(CheckArgs),

    /// Check whether a source file compiles and links
    Link(CheckArgs),

    /// Build a source file and run the result
    Run(CheckArgs),

    /// Run every built-in capability probe
    Report(ReportArgs),

    /// Show the resolved toolchain
    Toolchain,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct FlagArgs {
    /// Compiler flag to test (e.g. -fvisibility=hidden)
    #[arg(allow_hyphen_values = true)]
    pub flag: String,

    /// Source language (c or c++)
    #[arg(long, default_value = "c")]
    pub lang: Language,
}

#[derive(Args)]
pub struct HeaderArgs {
    /// Header name as written in #include <...> (e.g. zlib.h, sys/types.h)
    pub name: String,

    /// Source language (c or c++)
    #[arg(long, default_value = "c")]
    pub lang: Language,

    /// Extra compiler flags (e.g. "-I/opt/zlib/include")
    #[arg(long, allow_hyphen_values = true)]
    pub flags: Option<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Source file, or - to read from stdin
    pub file: PathBuf,

    /// Source language (c or c++)
    #[arg(long, default_value = "c")]
    pub lang: Language,

    /// Extra compiler or linker flags
    #[arg(long, allow_hyphen_values = true)]
    pub flags: Option<String>,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
