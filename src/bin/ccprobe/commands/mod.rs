//! Command implementations

pub mod check;
pub mod completions;
pub mod flag;
pub mod header;
pub mod report;
pub mod toolchain;

use anyhow::{Context, Result};

use ccprobe::core::platform::SystemEnv;
use ccprobe::util::config::{global_config_path, load_config, project_config_path};
use ccprobe::Prober;

/// Build a prober from the global and project config files.
pub fn load_prober() -> Result<Prober> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));
    let settings = config.to_settings(&SystemEnv);

    tracing::debug!(
        "work dir: {}, exe dir: {}",
        settings.work_dir.display(),
        settings.exe_dir.display()
    );

    Ok(Prober::new(settings))
}
