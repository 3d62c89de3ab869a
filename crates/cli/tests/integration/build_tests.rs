//! Build command integration tests.

#![cfg(unix)]

use predicates::prelude::*;

use super::common::{CAT_PROJECT, TestEnv};

fn cat_project() -> TestEnv {
  let env = TestEnv::new();
  env.write_file("project.orebuild", CAT_PROJECT);
  env.write_file("src/a.txt", "alpha\n");
  env.write_file("src/b.txt", "beta\n");
  env
}

#[test]
fn build_runs_the_command() {
  let env = cat_project();

  env
    .ore_cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("Built"));

  assert_eq!(env.read_file("out.txt"), "alpha\nbeta\n");
}

#[test]
fn second_build_is_up_to_date() {
  let env = cat_project();
  env.ore_cmd().arg("build").assert().success();

  env
    .ore_cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("up to date"));
}

#[test]
fn rebuild_runs_again() {
  let env = cat_project();
  env.ore_cmd().arg("build").assert().success();

  env
    .ore_cmd()
    .arg("rebuild")
    .assert()
    .success()
    .stdout(predicate::str::contains("Built"));
}

#[test]
fn json_output_reports_the_build() {
  let env = cat_project();

  let output = env.ore_cmd().args(["--output", "json", "build"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["platform"], "Linux");
  assert_eq!(report["configuration"], "Debug");
  assert_eq!(report["commands"], 1);
  assert_eq!(report["skipped"], false);
}

#[test]
fn json_output_stays_parseable_with_echoed_commands() {
  let env = TestEnv::new();
  env.write_file(
    "project.orebuild",
    r#"
output "out.txt";
include "";
files "src/*.txt";
command "cat $files > $out && echo concatenated";
"#,
  );
  env.write_file("src/a.txt", "alpha\n");

  let output = env.ore_cmd().args(["--output", "json", "build"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["commands"], 1);

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("cat src/a.txt > out.txt"));
  assert!(stderr.contains("concatenated"));
  assert_eq!(env.read_file("out.txt"), "alpha\n");
}

#[test]
fn text_output_echoes_commands_to_stdout() {
  let env = TestEnv::new();
  env.write_file(
    "project.orebuild",
    r#"
output "out.txt";
include "";
files "src/*.txt";
command "cat $files > $out";
"#,
  );
  env.write_file("src/a.txt", "alpha\n");

  env
    .ore_cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("cat src/a.txt > out.txt"));
}

#[test]
fn conf_selects_conditional_properties() {
  let env = TestEnv::new();
  env.write_file(
    "project.orebuild",
    r#"
include "";
files "src/*.txt";
[Release]: output "release.txt";
[!Release]: output "debug.txt";
command "@cat $files > $out";
"#,
  );
  env.write_file("src/a.txt", "alpha\n");

  env.ore_cmd().args(["--conf", "Release", "build"]).assert().success();

  assert!(env.path("release.txt").is_file());
  assert!(!env.path("debug.txt").exists());
}

#[test]
fn library_objects_are_linked_into_the_project() {
  let env = TestEnv::new();
  env.write_file(
    "project.orebuild",
    "output \"out.txt\";\ninclude \"\";\nfiles \"src/*.txt\";\nlibrary \"greeting\";\ncommand \"@cat $files > $out\";\n",
  );
  env.write_file("src/main.txt", "main\n");
  env.write_file(
    "libraries/greeting/library.orebuild",
    "include \"\";\nfiles \"src/*.txt\";\ncommand \"@cat $files > $out\";\n",
  );
  env.write_file("libraries/greeting/src/hello.txt", "hello\n");

  env.ore_cmd().arg("build").assert().success();

  assert_eq!(env.read_file("out.txt"), "main\nhello\n");
  assert!(env.path("libraries/greeting/build/Linux/Debug/greeting.o").is_file());
}

#[test]
fn failing_command_fails_the_build() {
  let env = TestEnv::new();
  env.write_file(
    "project.orebuild",
    "output \"out.txt\";\ninclude \"\";\nfiles \"src/*.txt\";\ncommand \"@false $files\";\n",
  );
  env.write_file("src/a.txt", "");

  env
    .ore_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("toolchain command failed"));
}

#[test]
fn malformed_descriptor_reports_line() {
  let env = TestEnv::new();
  env.write_file("project.orebuild", "output \"out.txt\";\nfiles \"src/*.txt\"");

  env
    .ore_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("project.orebuild:2"))
    .stderr(predicate::str::contains("missing semicolon"));
}
