use std::path::{Path, PathBuf};

use arbor::{
    Instruction, LoadError, Program,
    bytecode::{CallMode, ContainerTag, ProgramWarning, ValueRef},
    runtime::RawKey,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join("programs")
        .join(name)
}

#[test]
fn fixtures_load_and_validate_cleanly() {
    for name in ["hello.json", "buttons.json", "storm.json"] {
        let program = Program::load(&fixture(name))
            .unwrap_or_else(|e| panic!("failed to load {name}: {e}"));
        let warnings = program.validate().unwrap();
        assert!(warnings.is_empty(), "{name}: unexpected warnings {warnings:?}");
    }
}

#[test]
fn sections_keep_their_flags_and_bodies() {
    let program = Program::load(&fixture("hello.json")).unwrap();

    let main = program.section("main").unwrap();
    assert!(main.renderable);
    assert_eq!(main.body.len(), 2);
    assert_eq!(
        main.body[1],
        Instruction::Call {
            id: RawKey::Number(3),
            label: "footer".into(),
            mode: CallMode::MustBeRenderable,
        }
    );

    let footer = program.section("footer").unwrap();
    let Instruction::Container { tag, body, .. } = &footer.body[0] else {
        panic!("expected a container, got {:?}", footer.body[0]);
    };
    assert_eq!(*tag, ContainerTag::Root);
    assert_eq!(body.len(), 1);
}

#[test]
fn missing_files_report_their_path() {
    let path = fixture("does_not_exist.json");
    let err = Program::load(&path).unwrap_err();

    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("does_not_exist.json"), "{err}");
}

#[test]
fn malformed_files_are_rejected() {
    let err = Program::load(&fixture("malformed.json")).unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
}

#[test]
fn programs_without_main_fail_validation() {
    let program = Program::load(&fixture("no_main.json")).unwrap();
    let err = program.validate().unwrap_err();
    assert_eq!(err.to_string(), "no `main` code section found in the program");
}

#[test]
fn unreachable_dangling_calls_are_only_warnings() {
    let program = Program::load(&fixture("dangling.json")).unwrap();
    assert_eq!(
        program.validate().unwrap(),
        vec![ProgramWarning::UndefinedSection {
            from: "main".into(),
            label: "missing".into(),
        }]
    );
}

#[test]
fn programs_survive_serialization() {
    let program = Program::load(&fixture("buttons.json")).unwrap();
    let json = program.to_json().unwrap();
    assert_eq!(Program::from_json(&json).unwrap(), program);
}

#[test]
fn instruction_fields_have_defaults() {
    let code: Vec<Instruction> = serde_json::from_str(
        r#"[
            {"op": "container", "id": "nav"},
            {"op": "value", "id": 2, "value": {"stack": 0}},
            {"op": "call", "id": 3, "label": "helper"}
        ]"#,
    )
    .unwrap();

    assert_eq!(
        code,
        vec![
            Instruction::Container {
                id: RawKey::from("nav"),
                tag: ContainerTag::Default,
                body: vec![],
            },
            Instruction::Value {
                id: RawKey::Number(2),
                raw: false,
                value: ValueRef::Stack(0),
            },
            Instruction::Call {
                id: RawKey::Number(3),
                label: "helper".into(),
                mode: CallMode::CanBeAny,
            },
        ]
    );
}

#[test]
fn unknown_operations_are_rejected() {
    let result: Result<Vec<Instruction>, _> =
        serde_json::from_str(r#"[{"op": "jump", "id": 1}]"#);
    assert!(result.is_err());
}

#[test]
fn unsafe_mode_is_read_from_the_program() {
    let program = Program::from_json(r#"{"unsafe_mode": true, "sections": []}"#).unwrap();
    assert!(program.unsafe_mode);
    assert!(!Program::default().unsafe_mode);
}
