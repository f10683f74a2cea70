//! `ccprobe report` command

use anyhow::{Context, Result};

use ccprobe::CapabilityReport;

use crate::cli::ReportArgs;
use crate::commands::load_prober;

pub fn execute(args: ReportArgs) -> Result<()> {
    let prober = load_prober()?;
    let report = prober.report();

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize capability report")?;
        println!("{}", json);
    } else {
        print_table(&report);
    }

    Ok(())
}

fn print_table(report: &CapabilityReport) {
    println!("Toolchain:");
    println!("  os:        {}", report.os);
    println!("  cc:        {}", report.cc);
    println!("  cxx:       {}", report.cxx);
    println!("  make:      {}", or_none(report.make.as_deref()));
    println!("  gnu make:  {}", or_none(report.gnu_make.as_deref()));
    println!();

    println!("Compiler:");
    row("cc is gcc", report.cc_is_gcc);
    row("cc is clang", report.cc_is_clang);
    row("c++ is clang", report.cxx_is_clang);
    row("cc is Sun Studio", report.cc_is_sun_studio);
    println!();

    println!("Flags:");
    row("-fvisibility=hidden", report.supports_visibility_flag);
    row(
        "-fvisibility=hidden warns",
        report.visibility_flag_generates_warnings,
    );
    row("-Wno-attributes", report.supports_wno_attributes_flag);
    row(
        "-Wno-missing-field-initializers",
        report.supports_wno_missing_field_initializers_flag,
    );
    row(
        "-mno-tls-direct-seg-refs",
        report.supports_no_tls_direct_seg_refs_option,
    );
    row(
        "-Wno-ambiguous-member-template",
        report.supports_wno_ambiguous_member_template,
    );
    row(
        "-feliminate-unused-debug-*",
        report.supports_feliminate_unused_debug,
    );
    println!();

    println!("Libraries:");
    row("libmath", report.has_math_library);
    row("alloca.h", report.has_alloca_h);
    println!("  {:<34} {}", "debugging cflags", report.debugging_cflags);
    println!(
        "  {:<34} {}",
        "dmalloc ldflags",
        or_none(report.dmalloc_ldflags.as_deref())
    );
    println!(
        "  {:<34} {}",
        "electric fence ldflags",
        or_none(report.electric_fence_ldflags.as_deref())
    );
    println!(
        "  {:<34} {}",
        "export dynamic flags",
        or_none(report.export_dynamic_flags.as_deref())
    );
}

fn row(label: &str, value: bool) {
    println!("  {:<34} {}", label, if value { "yes" } else { "no" });
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("(none)")
}
