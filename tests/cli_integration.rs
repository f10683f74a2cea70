//! CLI integration tests for ccprobe.
//!
//! A shell script stands in for the compiler so these tests do not depend on
//! an installed toolchain. The fake:
//! - fails any source containing `BROKEN` or `missing`
//! - prints a GCC-style version and include search list with `-v`
//! - writes an empty object with `-c`, or an executable shell script when
//!   linking; the script exits 1 if the source contains `EXIT_ONE`

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use assert_cmd::Command;

use predicates::prelude::*;
use tempfile::TempDir;

const FAKE_COMPILER: &str = r##"#!/bin/sh
out=""
src=""
compile_only=0
verbose=0
while [ $# -gt 0 ]; do
  case "$1" in
    -o) shift; out="$1" ;;
    -c) compile_only=1 ;;
    -v) verbose=1 ;;
    *.c|*.cpp) src="$1" ;;
  esac
  shift
done
if [ "$verbose" = 1 ]; then
  echo "gcc version 12.2.0 (fake)" >&2
  echo "#include <...> search starts here:" >&2
  echo " $FAKE_INCLUDE_DIR" >&2
  echo "End of search list." >&2
fi
if [ -n "$src" ] && grep -q -e BROKEN -e missing "$src"; then
  echo "error: rejected" >&2
  exit 1
fi
[ -z "$out" ] && exit 0
if [ "$compile_only" = 1 ]; then
  : > "$out"
else
  status=0
  grep -q EXIT_ONE "$src" && status=1
  printf '#!/bin/sh\necho ran\nexit %s\n' "$status" > "$out"
  chmod +x "$out"
fi
exit 0
"##;

/// Isolated environment: fake compilers, private temp dirs, no user config.
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["bin", "home", "work", "exe", "include"] {
            fs::create_dir_all(root.path().join(dir)).unwrap();
        }

        let cc = root.path().join("bin").join("fake-cc");
        fs::write(&cc, FAKE_COMPILER).unwrap();
        fs::set_permissions(&cc, fs::Permissions::from_mode(0o755)).unwrap();

        Sandbox { root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn compiler(&self) -> PathBuf {
        self.path("bin").join("fake-cc")
    }

    fn ccprobe(&self) -> Command {
        let mut cmd = Command::cargo_bin("ccprobe").unwrap();
        cmd.current_dir(self.root.path())
            .env("HOME", self.path("home"))
            .env("CC", self.compiler())
            .env("CXX", self.compiler())
            .env("CCPROBE_OS", "linux")
            .env("CCPROBE_TMPDIR", self.path("work"))
            .env("CCPROBE_EXE_DIR", self.path("exe"))
            .env("FAKE_INCLUDE_DIR", self.path("include"))
            .env_remove("EXTRA_CFLAGS")
            .env_remove("EXTRA_PRE_CFLAGS")
            .env_remove("EXTRA_CXXFLAGS")
            .env_remove("EXTRA_PRE_CXXFLAGS")
            .env_remove("EXTRA_LDFLAGS")
            .env_remove("EXTRA_PRE_LDFLAGS");
        cmd
    }

    fn assert_clean(&self) {
        assert_eq!(entries(&self.path("work")), Vec::<PathBuf>::new());
        assert_eq!(entries(&self.path("exe")), Vec::<PathBuf>::new());
    }
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

// ============================================================================
// ccprobe flag
// ============================================================================

#[test]
fn test_flag_supported() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["flag", "-fvisibility=hidden"])
        .assert()
        .success()
        .stdout("yes\n");

    sandbox.assert_clean();
}

#[test]
fn test_flag_with_missing_compiler() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .env("CC", sandbox.path("bin").join("no-such-cc"))
        .args(["flag", "-Wall"])
        .assert()
        .success()
        .stdout("no\n");

    sandbox.assert_clean();
}

#[test]
fn test_unsupported_language_is_rejected() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["flag", "-Wall", "--lang", "fortran"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported language"));

    sandbox.assert_clean();
}

// ============================================================================
// ccprobe header
// ============================================================================

#[test]
fn test_header_found_in_search_list() {
    let sandbox = Sandbox::new();
    let header = sandbox.path("include").join("foo.h");
    fs::write(&header, "").unwrap();

    sandbox
        .ccprobe()
        .args(["header", "foo.h"])
        .assert()
        .success()
        .stdout(format!("{}\n", header.display()));

    sandbox.assert_clean();
}

#[test]
fn test_header_present_but_unlisted() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["header", "bar.h", "--lang", "c++"])
        .assert()
        .success()
        .stdout("present\n");
}

#[test]
fn test_header_not_found() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["header", "missing.h"])
        .assert()
        .failure()
        .stdout("not found\n");

    sandbox.assert_clean();
}

// ============================================================================
// ccprobe compile / link / run
// ============================================================================

#[test]
fn test_compile_file() {
    let sandbox = Sandbox::new();
    let good = sandbox.path("good.c");
    let bad = sandbox.path("bad.c");
    fs::write(&good, "int x;").unwrap();
    fs::write(&bad, "BROKEN").unwrap();

    sandbox
        .ccprobe()
        .arg("compile")
        .arg(&good)
        .assert()
        .success()
        .stdout("ok\n");

    sandbox
        .ccprobe()
        .arg("compile")
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("build failed: exit status 1"));

    sandbox.assert_clean();
}

#[test]
fn test_link_from_stdin() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["link", "-", "--flags", "-lm"])
        .write_stdin("int main(void) { return 0; }\n")
        .assert()
        .success()
        .stdout("ok\n");

    sandbox.assert_clean();
}

#[test]
fn test_run_passes() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["run", "-"])
        .write_stdin("int main(void) { return 0; }\n")
        .assert()
        .success()
        .stdout("passed\n");

    sandbox.assert_clean();
}

#[test]
fn test_run_failure_is_distinct_from_build_failure() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["run", "-"])
        .write_stdin("int main(void) { return 1; } /* EXIT_ONE */\n")
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("run failed: exit status 1"))
        .stdout(predicate::str::contains("ran"));

    sandbox
        .ccprobe()
        .args(["run", "-"])
        .write_stdin("BROKEN\n")
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("build failed"));

    sandbox.assert_clean();
}

#[test]
fn test_missing_source_file() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["compile", "does-not-exist.c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read source file"));
}

// ============================================================================
// ccprobe report / toolchain / completions
// ============================================================================

#[test]
fn test_report_json() {
    let sandbox = Sandbox::new();

    let output = sandbox
        .ccprobe()
        .args(["report", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["os"], "linux");
    assert_eq!(report["cc"], sandbox.compiler().display().to_string());
    assert_eq!(report["cc_is_gcc"], true);
    assert_eq!(report["cc_is_clang"], false);
    assert_eq!(report["debugging_cflags"], "-ggdb");
    assert_eq!(report["export_dynamic_flags"], "-rdynamic");
    assert_eq!(report["has_alloca_h"], true);

    sandbox.assert_clean();
}

#[test]
fn test_report_table() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Flags:"))
        .stdout(predicate::str::contains("-Wno-attributes"));
}

#[test]
fn test_toolchain_shows_compiler() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .arg("toolchain")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "CC:       {}",
            sandbox.compiler().display()
        )))
        .stdout(predicate::str::contains("OS:       linux"));
}

#[test]
fn test_completions_bash() {
    let sandbox = Sandbox::new();

    sandbox
        .ccprobe()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ccprobe"));
}

#[test]
fn test_project_config_is_read() {
    let sandbox = Sandbox::new();
    let custom = sandbox.path("custom-work");
    fs::create_dir_all(sandbox.path(".ccprobe")).unwrap();
    fs::write(
        sandbox.path(".ccprobe").join("config.toml"),
        format!("[probe]\nwork_dir = \"{}\"\n", custom.display()),
    )
    .unwrap();

    sandbox
        .ccprobe()
        .env_remove("CCPROBE_TMPDIR")
        .arg("toolchain")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Work dir: {}",
            custom.display()
        )));
}
