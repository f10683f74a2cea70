//! `ccprobe header` command

use anyhow::Result;

use ccprobe::HeaderLocation;

use crate::cli::HeaderArgs;
use crate::commands::load_prober;

pub fn execute(args: HeaderArgs) -> Result<()> {
    let prober = load_prober()?;

    match prober.find_header(&args.name, args.lang, args.flags.as_deref()) {
        HeaderLocation::Found(path) => println!("{}", path.display()),
        HeaderLocation::PresentPathUnknown => println!("present"),
        HeaderLocation::NotFound => {
            println!("not found");
            std::process::exit(1);
        }
    }

    Ok(())
}
