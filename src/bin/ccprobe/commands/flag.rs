//! `ccprobe flag` command

use anyhow::Result;

use crate::cli::FlagArgs;
use crate::commands::load_prober;

pub fn execute(args: FlagArgs) -> Result<()> {
    let prober = load_prober()?;

    let supported = prober.try_compile(
        &format!("Checking for {} compiler '{}' support", args.lang, args.flag),
        args.lang,
        "",
        Some(&args.flag),
    );

    println!("{}", if supported { "yes" } else { "no" });
    Ok(())
}
