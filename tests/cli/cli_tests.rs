use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn program_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join("programs")
        .join(name)
}

fn run_arbor(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_arbor"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to run arbor with args {:?}: {e}", args))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn run_prints_the_rendered_tree() {
    let file = program_path("hello.json");
    let output = run_arbor(&["run", file.to_str().unwrap()]);

    assert!(output.status.success(), "stderr:\n{}", stderr(&output));
    assert_eq!(
        stdout(&output).trim_end(),
        concat!(
            r#"<div id="root">"#,
            r#"<h1 x-id="container-1"><span x-id="rawValue-2">Hello, arbor</span></h1>"#,
            r#"<footer x-id="container-11"><em x-id="rawValue-12">rendered</em> markup</footer>"#,
            "</div>"
        )
    );
}

#[test]
fn scripted_events_are_delivered_in_order() {
    let file = program_path("buttons.json");
    let output = run_arbor(&[
        "run",
        file.to_str().unwrap(),
        "--event",
        "click@container-1",
        "--event",
        "click@container-4",
    ]);
    let out = stdout(&output);

    assert!(!output.status.success(), "expected failure, stdout:\n{}", out);
    assert!(
        out.contains("<pre>StackUnderflowError: cannot pop a value off the stack"),
        "expected the error display, stdout:\n{}",
        out
    );
}

#[test]
fn events_for_unknown_nodes_are_skipped() {
    let file = program_path("buttons.json");
    let output = run_arbor(&["run", file.to_str().unwrap(), "--event", "click@elem-99"]);

    assert!(output.status.success(), "stderr:\n{}", stderr(&output));
    assert!(
        stderr(&output).contains("no node for scripted event"),
        "stderr:\n{}",
        stderr(&output)
    );
}

#[test]
fn self_rerendering_programs_fail_with_a_storm_error() {
    let file = program_path("storm.json");
    let output = run_arbor(&["run", file.to_str().unwrap(), "--settle-ms", "1"]);

    assert!(!output.status.success());
    assert!(
        stdout(&output).contains("RerenderStormError"),
        "stdout:\n{}",
        stdout(&output)
    );
}

#[test]
fn unsafe_mode_stops_after_max_cycles() {
    let file = program_path("storm.json");
    let output = run_arbor(&[
        "run",
        file.to_str().unwrap(),
        "--unsafe",
        "--settle-ms",
        "1",
        "--max-cycles",
        "3",
    ]);

    assert!(output.status.success(), "stderr:\n{}", stderr(&output));
    assert!(
        stderr(&output).contains("output did not settle"),
        "stderr:\n{}",
        stderr(&output)
    );
    assert!(stdout(&output).contains(r#"<hr x-id="elem-1">"#));
}

#[test]
fn programs_without_main_are_rejected() {
    let file = program_path("no_main.json");
    let output = run_arbor(&["run", file.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr(&output).contains("no `main` code section found in the program"),
        "stderr:\n{}",
        stderr(&output)
    );
    assert!(stdout(&output).is_empty());
}

#[test]
fn check_reports_dangling_references() {
    let file = program_path("dangling.json");
    let output = run_arbor(&["check", file.to_str().unwrap()]);

    assert!(output.status.success(), "stderr:\n{}", stderr(&output));
    assert!(
        stderr(&output).contains("section `main` references undefined section `missing`"),
        "stderr:\n{}",
        stderr(&output)
    );
}

#[test]
fn check_rejects_malformed_programs() {
    let file = program_path("malformed.json");
    let output = run_arbor(&["check", file.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr(&output).contains("malformed program"),
        "stderr:\n{}",
        stderr(&output)
    );
}
