//! `ccprobe toolchain` command

use anyhow::Result;

use ccprobe::core::language::{EXTRA_LDFLAGS, EXTRA_PRE_LDFLAGS};
use ccprobe::core::platform::OS_OVERRIDE_VAR;
use ccprobe::util::config::{EXE_DIR_VAR, TMPDIR_VAR};
use ccprobe::util::process::{OutputMode, ProcessBuilder};
use ccprobe::Language;

use crate::commands::load_prober;

pub fn execute() -> Result<()> {
    let prober = load_prober()?;

    println!("Toolchain:");
    println!();

    let cc = prober.cc();
    println!("  CC:       {}", cc);
    if let Some(version) = first_version_line(&cc) {
        println!("            {}", version);
    }

    let cxx = prober.cxx();
    println!("  CXX:      {}", cxx);
    if let Some(version) = first_version_line(&cxx) {
        println!("            {}", version);
    }

    println!("  MAKE:     {}", prober.make().as_deref().unwrap_or("not found"));
    println!(
        "  GNU make: {}",
        prober.gnu_make().as_deref().unwrap_or("not found")
    );

    println!();
    println!("  OS:       {}", prober.env().os_name());
    println!("  Work dir: {}", prober.settings().work_dir.display());
    println!("  Exe dir:  {}", prober.settings().exe_dir.display());

    println!();
    println!("Environment:");
    let vars = [
        "CC",
        "CXX",
        "MAKE",
        "GMAKE",
        Language::C.pre_flags_var(),
        Language::C.flags_var(),
        Language::Cxx.pre_flags_var(),
        Language::Cxx.flags_var(),
        EXTRA_PRE_LDFLAGS,
        EXTRA_LDFLAGS,
        OS_OVERRIDE_VAR,
        TMPDIR_VAR,
        EXE_DIR_VAR,
    ];
    for var in vars {
        if let Some(value) = prober.env().string_env(var) {
            println!("  {}={}", var, value);
        }
    }

    Ok(())
}

fn first_version_line(compiler: &str) -> Option<String> {
    let process = ProcessBuilder::from_command_line(compiler).ok()??;
    let done = process.arg("--version").run(OutputMode::Capture).ok()?;
    done.output?
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}
