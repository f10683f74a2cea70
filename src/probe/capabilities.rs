//! Named capability checks built on the generic compile, link, and header probes.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::Serialize;

use crate::core::language::Language;
use crate::core::platform::{default_cc, default_cxx, Role};

use super::cache::ProbeDef;
use super::checks::ProbeRequest;
use super::executor::{ExecMode, ProbeOutcome};
use super::Prober;

const CC_IS_GCC: ProbeDef = ProbeDef::memoized("cc_is_gcc");
const CC_IS_CLANG: ProbeDef = ProbeDef::memoized("cc_is_clang");
const CXX_IS_CLANG: ProbeDef = ProbeDef::memoized("cxx_is_clang");
const CC_IS_SUN_STUDIO: ProbeDef = ProbeDef::memoized("cc_is_sun_studio");
const VISIBILITY_FLAG: ProbeDef = ProbeDef::memoized("compiler_supports_visibility_flag");
const WNO_ATTRIBUTES: ProbeDef = ProbeDef::memoized("compiler_supports_wno_attributes_flag");
const WNO_MISSING_FIELD_INITIALIZERS: ProbeDef =
    ProbeDef::memoized("compiler_supports_wno_missing_field_initializers_flag");
const NO_TLS_DIRECT_SEG_REFS: ProbeDef =
    ProbeDef::memoized("compiler_supports_no_tls_direct_seg_refs_option");
const WNO_AMBIGUOUS_MEMBER_TEMPLATE: ProbeDef =
    ProbeDef::memoized("compiler_supports_wno_ambiguous_member_template");
const FELIMINATE_UNUSED_DEBUG: ProbeDef =
    ProbeDef::memoized("compiler_supports_feliminate_unused_debug");
const VISIBILITY_WARNINGS: ProbeDef =
    ProbeDef::memoized("compiler_visibility_flag_generates_warnings");
const MATH_LIBRARY: ProbeDef = ProbeDef::memoized("has_math_library");
const ALLOCA_H: ProbeDef = ProbeDef::memoized("has_alloca_h");
const DMALLOC_LDFLAGS: ProbeDef = ProbeDef::memoized("dmalloc_ldflags");
const ELECTRIC_FENCE_LDFLAGS: ProbeDef = ProbeDef::memoized("electric_fence_ldflags");
const MAKE: ProbeDef = ProbeDef::fresh("make");
const GNU_MAKE: ProbeDef = ProbeDef::fresh("gnu_make");

/// Prefixes searched for static debug allocator libraries on macOS.
const MACOSX_LIB_PREFIXES: [&str; 3] = ["/opt/local", "/usr/local", "/usr"];

/// GCC releases up to this one warn about `-fvisibility=hidden` in C++.
const LAST_NOISY_VISIBILITY_GCC: Version = Version::new(4, 1, 2);

static GCC_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"gcc version (\d+(?:\.\d+){0,2})").expect("gcc version pattern is valid")
});

/// Every catalogued capability, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    pub os: String,
    pub cc: String,
    pub cxx: String,
    pub make: Option<String>,
    pub gnu_make: Option<String>,
    pub cc_is_gcc: bool,
    pub cc_is_clang: bool,
    pub cxx_is_clang: bool,
    pub cc_is_sun_studio: bool,
    pub supports_visibility_flag: bool,
    pub visibility_flag_generates_warnings: bool,
    pub supports_wno_attributes_flag: bool,
    pub supports_wno_missing_field_initializers_flag: bool,
    pub supports_no_tls_direct_seg_refs_option: bool,
    pub supports_wno_ambiguous_member_template: bool,
    pub supports_feliminate_unused_debug: bool,
    pub has_math_library: bool,
    pub has_alloca_h: bool,
    pub debugging_cflags: String,
    pub dmalloc_ldflags: Option<String>,
    pub electric_fence_ldflags: Option<String>,
    pub export_dynamic_flags: Option<String>,
}

impl Prober {
    // =========================================================================
    // Toolchain binaries
    // =========================================================================

    /// The C compiler command (`CC` or the OS default).
    pub fn cc(&self) -> String {
        self.env()
            .resolve_binary(Role::CCompiler)
            .unwrap_or_else(|| self.default_cc().to_string())
    }

    /// The C++ compiler command (`CXX` or the OS default).
    pub fn cxx(&self) -> String {
        self.env()
            .resolve_binary(Role::CxxCompiler)
            .unwrap_or_else(|| self.default_cxx().to_string())
    }

    pub fn default_cc(&self) -> &'static str {
        default_cc(&self.env().os_name())
    }

    pub fn default_cxx(&self) -> &'static str {
        default_cxx(&self.env().os_name())
    }

    /// Any `make`: `MAKE`, or `make` on `PATH`.
    pub fn make(&self) -> Option<String> {
        self.cache()
            .get_or_compute(&MAKE, || self.env().resolve_binary(Role::Make))
    }

    /// A GNU make: `GMAKE`, `gmake` on `PATH`, or a `make` that says it is GNU.
    pub fn gnu_make(&self) -> Option<String> {
        self.cache().get_or_compute(&GNU_MAKE, || -> Option<String> {
            if let Some(gmake) = self.env().string_env("GMAKE") {
                return Some(gmake);
            }
            if let Some(gmake) = self.env().find_command("gmake") {
                return Some(gmake.display().to_string());
            }
            let make = self.env().find_command("make")?.display().to_string();
            let version = self.tool_output(&format!("{} --version", make))?;
            version.contains("GNU").then_some(make)
        })
    }

    // =========================================================================
    // Compiler identification
    // =========================================================================

    pub fn cc_is_gcc(&self) -> bool {
        self.cache().get_or_compute(&CC_IS_GCC, || {
            self.tool_output(&format!("{} -v", self.cc()))
                .is_some_and(|out| out.contains("gcc version"))
        })
    }

    pub fn cc_is_clang(&self) -> bool {
        self.cache().get_or_compute(&CC_IS_CLANG, || {
            self.tool_output(&format!("{} --version", self.cc()))
                .is_some_and(|out| out.contains("clang version"))
        })
    }

    pub fn cxx_is_clang(&self) -> bool {
        self.cache().get_or_compute(&CXX_IS_CLANG, || {
            self.tool_output(&format!("{} --version", self.cxx()))
                .is_some_and(|out| out.contains("clang version"))
        })
    }

    pub fn cc_is_sun_studio(&self) -> bool {
        self.cache().get_or_compute(&CC_IS_SUN_STUDIO, || {
            let cc = self.cc();
            ["-V", "-flags"].iter().any(|flag| {
                self.tool_output(&format!("{} {}", cc, flag))
                    .is_some_and(|out| out.contains("Sun C"))
            })
        })
    }

    // =========================================================================
    // Flag support
    // =========================================================================

    /// Whether the C compiler accepts `-arch <arch>`.
    pub fn compiler_supports_architecture(&self, arch: &str) -> bool {
        self.try_compile(
            "Checking for C compiler '-arch' support",
            Language::C,
            "",
            Some(&format!("-arch {}", arch)),
        )
    }

    /// Whether the C compiler accepts `-fvisibility=hidden`.
    ///
    /// Always false on AIX without asking the compiler.
    pub fn compiler_supports_visibility_flag(&self) -> bool {
        self.cache().get_or_compute(&VISIBILITY_FLAG, || {
            if self.env().os_name().is_aix() {
                return false;
            }
            self.try_compile(
                "Checking for C compiler '-fvisibility' support",
                Language::C,
                "",
                Some("-fvisibility=hidden"),
            )
        })
    }

    pub fn compiler_supports_wno_attributes_flag(&self) -> bool {
        self.flag_check(&WNO_ATTRIBUTES, "-Wno-attributes")
    }

    pub fn compiler_supports_wno_missing_field_initializers_flag(&self) -> bool {
        self.flag_check(&WNO_MISSING_FIELD_INITIALIZERS, "-Wno-missing-field-initializers")
    }

    pub fn compiler_supports_no_tls_direct_seg_refs_option(&self) -> bool {
        self.flag_check(&NO_TLS_DIRECT_SEG_REFS, "-mno-tls-direct-seg-refs")
    }

    pub fn compiler_supports_wno_ambiguous_member_template(&self) -> bool {
        self.flag_check(&WNO_AMBIGUOUS_MEMBER_TEMPLATE, "-Wno-ambiguous-member-template")
    }

    /// Whether both `-feliminate-unused-debug-*` flags are accepted silently.
    ///
    /// Some compilers accept them with a warning, so any output counts as
    /// unsupported.
    pub fn compiler_supports_feliminate_unused_debug(&self) -> bool {
        self.cache().get_or_compute(&FELIMINATE_UNUSED_DEBUG, || {
            let request = ProbeRequest::compile(
                "Checking for C compiler '-feliminate-unused-debug-{symbols,types}' support",
                Language::C,
                "",
            )
            .with_flags(Some(
                "-feliminate-unused-debug-symbols -feliminate-unused-debug-types",
            ));
            match self.run_request(&request, ExecMode::Capture) {
                ProbeOutcome::Success { output } => {
                    output.as_deref().unwrap_or_default().trim().is_empty()
                }
                _ => false,
            }
        })
    }

    /// Whether C++ with `-fvisibility=hidden` floods the build with bogus
    /// warnings, as g++ up to 4.1.2 does. Suppress them with `-Wno-attributes`.
    pub fn compiler_visibility_flag_generates_warnings(&self) -> bool {
        self.cache().get_or_compute(&VISIBILITY_WARNINGS, || {
            if !self.env().os_name().is_linux() {
                return false;
            }
            self.tool_output(&format!("{} -v", self.cxx()))
                .and_then(|out| parse_gcc_version(&out))
                .is_some_and(|version| version <= LAST_NOISY_VISIBILITY_GCC)
        })
    }

    // =========================================================================
    // Libraries and headers
    // =========================================================================

    pub fn has_math_library(&self) -> bool {
        self.cache().get_or_compute(&MATH_LIBRARY, || {
            self.try_link(
                "Checking for -lmath support",
                Language::C,
                "int main() { return 0; }\n",
                Some("-lmath"),
            )
        })
    }

    pub fn has_alloca_h(&self) -> bool {
        self.cache().get_or_compute(&ALLOCA_H, || {
            self.try_compile("Checking for alloca.h", Language::C, "#include <alloca.h>", None)
        })
    }

    // =========================================================================
    // Flags for the build
    // =========================================================================

    /// Flags that enable debugging information: `-ggdb` with GCC, else `-g`.
    pub fn debugging_cflags(&self) -> &'static str {
        if self.cc_is_gcc() {
            "-ggdb"
        } else {
            "-g"
        }
    }

    /// Linker flags for the dmalloc debug allocator, if available.
    pub fn dmalloc_ldflags(&self) -> Option<String> {
        self.cache().get_or_compute(&DMALLOC_LDFLAGS, || {
            if let Some(libs) = self.env().string_env("DMALLOC_LIBS") {
                return Some(libs);
            }
            self.static_lib_or_flag("libdmallocthcxx.a", "-ldmallocthcxx")
        })
    }

    /// Linker flags for Electric Fence, if available.
    pub fn electric_fence_ldflags(&self) -> Option<String> {
        self.cache().get_or_compute(&ELECTRIC_FENCE_LDFLAGS, || {
            self.static_lib_or_flag("libefence.a", "-lefence")
        })
    }

    /// Flags that export all symbols to the dynamic symbol table.
    pub fn export_dynamic_flags(&self) -> Option<&'static str> {
        if self.env().os_name().is_linux() {
            Some("-rdynamic")
        } else {
            None
        }
    }

    /// Run every catalogued probe.
    pub fn report(&self) -> CapabilityReport {
        CapabilityReport {
            os: self.env().os_name().to_string(),
            cc: self.cc(),
            cxx: self.cxx(),
            make: self.make(),
            gnu_make: self.gnu_make(),
            cc_is_gcc: self.cc_is_gcc(),
            cc_is_clang: self.cc_is_clang(),
            cxx_is_clang: self.cxx_is_clang(),
            cc_is_sun_studio: self.cc_is_sun_studio(),
            supports_visibility_flag: self.compiler_supports_visibility_flag(),
            visibility_flag_generates_warnings: self.compiler_visibility_flag_generates_warnings(),
            supports_wno_attributes_flag: self.compiler_supports_wno_attributes_flag(),
            supports_wno_missing_field_initializers_flag: self
                .compiler_supports_wno_missing_field_initializers_flag(),
            supports_no_tls_direct_seg_refs_option: self
                .compiler_supports_no_tls_direct_seg_refs_option(),
            supports_wno_ambiguous_member_template: self
                .compiler_supports_wno_ambiguous_member_template(),
            supports_feliminate_unused_debug: self.compiler_supports_feliminate_unused_debug(),
            has_math_library: self.has_math_library(),
            has_alloca_h: self.has_alloca_h(),
            debugging_cflags: self.debugging_cflags().to_string(),
            dmalloc_ldflags: self.dmalloc_ldflags(),
            electric_fence_ldflags: self.electric_fence_ldflags(),
            export_dynamic_flags: self.export_dynamic_flags().map(str::to_string),
        }
    }

    fn flag_check(&self, def: &ProbeDef, flag: &str) -> bool {
        self.cache().get_or_compute(def, || {
            self.try_compile(
                &format!("Checking for C compiler '{}' support", flag),
                Language::C,
                "",
                Some(flag),
            )
        })
    }

    /// On macOS, the first `<prefix>/lib/<archive>` that exists; elsewhere
    /// the plain `-l` flag, left to the linker to resolve.
    fn static_lib_or_flag(&self, archive: &str, flag: &str) -> Option<String> {
        if !self.env().os_name().is_macosx() {
            return Some(flag.to_string());
        }
        MACOSX_LIB_PREFIXES
            .iter()
            .map(|prefix| PathBuf::from(prefix).join("lib").join(archive))
            .find(|path| self.env().file_exists(path))
            .map(|path| path.display().to_string())
    }

    /// Combined output of a tool invocation, whatever its exit status.
    ///
    /// Identification probes such as `cc -V` exit nonzero on compilers that
    /// do not know the flag; the output is still what matters.
    fn tool_output(&self, command: &str) -> Option<String> {
        tracing::debug!("Running: {}", command);
        match self.runner().run(command, ExecMode::Capture) {
            Ok(done) => done.output,
            Err(e) => {
                tracing::debug!("Command could not be executed! {}", e);
                None
            }
        }
    }
}

/// Parse the version out of `gcc -v` output, padding `4.1` to `4.1.0`.
fn parse_gcc_version(output: &str) -> Option<Version> {
    let raw = GCC_VERSION.captures(output)?.get(1)?.as_str();
    let mut parts: Vec<&str> = raw.split('.').collect();
    while parts.len() < 3 {
        parts.push("0");
    }
    Version::parse(&parts.join(".")).ok()
}
