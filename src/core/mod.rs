//! Core types shared by the probes.
//!
//! - [`language`]: the closed set of source languages a probe can compile
//! - [`platform`]: the host environment (env vars, OS name, `PATH`)

pub mod language;
pub mod platform;

pub use language::Language;
pub use platform::{HostEnv, OsName, Role, SystemEnv};
