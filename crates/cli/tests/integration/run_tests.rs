//! Run command integration tests.

#![cfg(unix)]

use predicates::prelude::*;

use super::common::TestEnv;

/// A project whose build writes a small shell script as its output.
const SCRIPT_PROJECT: &str = r#"
output "bin/hello.sh";
include "";
files "";
command "@printf '#!/bin/sh\necho hello $1\n' > $out; chmod +x $out";
"#;

#[test]
fn run_builds_and_executes_output() {
  let env = TestEnv::new();
  env.write_file("project.orebuild", SCRIPT_PROJECT);

  env
    .ore_cmd()
    .args(["run", ".", "--", "world"])
    .assert()
    .success()
    .stdout(predicate::str::contains("hello world"));
}

#[test]
fn run_propagates_exit_code() {
  let env = TestEnv::new();
  env.write_file(
    "project.orebuild",
    r#"
output "fail.sh";
include "";
files "";
command "@printf '#!/bin/sh\nexit 3\n' > $out; chmod +x $out";
"#,
  );

  env.ore_cmd().arg("run").assert().code(3);
}

#[test]
fn run_library_fails() {
  let env = TestEnv::new();
  env.write_file("library.orebuild", "include \"\";\nfiles \"\";\ncommand \"@true $files\";\n");

  env
    .ore_cmd()
    .arg("run")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no output to run"));
}
