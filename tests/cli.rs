use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;

#[test]
fn headless_run_prints_scene_and_final_state() {
    let mut cmd = Command::cargo_bin("vapor-runtime").expect("binary exists");
    cmd.args(["--summary-only", "--frames", "1"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 4 entities (1 cameras)"))
        .stdout(contains(" - Paddle1 (2 behaviors)"))
        .stdout(contains(" - Camera pos=(0.00, 0.00, -7.00)"))
        .stdout(contains(" - Paddle1 pos=(3.50, 0.00, 0.00)"))
        .stdout(contains(" - Paddle2 pos=(-3.50, 0.03, 0.00)"))
        .stdout(contains(" - Ball pos=(-0.10, -0.10, 0.00)"))
        .stdout(contains("Final score: 0 - 0"));
}

#[test]
fn long_runs_finish_with_a_score_line() {
    let mut cmd = Command::cargo_bin("vapor-runtime").expect("binary exists");
    cmd.args(["--summary-only", "--frames", "600"]);
    cmd.assert().success().stdout(contains("Final score:"));
}

#[test]
fn viewport_flags_are_accepted() {
    let mut cmd = Command::cargo_bin("vapor-runtime").expect("binary exists");
    cmd.args(["--summary-only", "--frames", "0", "--width", "640", "--height", "480"]);
    cmd.assert()
        .success()
        .stdout(contains(" - Ball pos=(0.00, 0.00, 0.00)"));
}

#[test]
fn unknown_arguments_fail() {
    let mut cmd = Command::cargo_bin("vapor-runtime").expect("binary exists");
    cmd.arg("--bogus");
    cmd.assert().failure().stderr(contains("Unknown argument: --bogus"));
}

#[test]
fn malformed_environment_is_reported() {
    let mut cmd = Command::cargo_bin("vapor-runtime").expect("binary exists");
    cmd.env("VAPOR_WIDTH", "wide").arg("--summary-only");
    cmd.assert().failure().stderr(contains("VAPOR_WIDTH"));
}
