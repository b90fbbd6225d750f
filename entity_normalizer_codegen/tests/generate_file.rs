use std::fs;

use entity_normalizer_codegen::{CodegenConfig, CodegenError, error::DiagnosticKind, generate_file};

const MODEL: &str = r#"
pub mod user {
    #[entity_spec(name = "user")]
    #[derive(Eq, Hash)]
    pub struct UserSpec {
        #[entity_id]
        user_id: i64,
        /// Display name
        name: String,
    }
}

pub mod message {
    use super::user::User;

    #[entity_spec(name = "message")]
    pub struct MessageSpec {
        #[entity_id]
        message_id: i64,
        sender: User,
        recipients: Vec<User>,
    }
}
"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_model(dir: &tempfile::TempDir, source: &str) -> std::path::PathBuf {
    let path = dir.path().join("model.rs");
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn test_writes_one_file_per_type() {
    init_logger();
    let input_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = write_model(&input_dir, MODEL);

    let report = generate_file(&input, out_dir.path(), &CodegenConfig::default()).unwrap();
    let written = report.into_result().unwrap();
    assert_eq!(written.len(), 10);

    let user = fs::read_to_string(out_dir.path().join("user").join("user.rs")).unwrap();
    assert!(user.starts_with("// Generated by entity_normalizer. Do not edit."));
    assert!(user.contains("#[derive(Debug, Clone, PartialEq, Eq, Hash)]"));
    assert!(user.contains("/// Display name"));
    assert!(user.contains("pub fn name(&self) -> &String {"));

    let store = out_dir.path().join("store");
    for file in [
        "in_memory_entity_store.rs",
        "normalized_entity_repository.rs",
        "normalized_entity_repository_builder.rs",
        "entity_store_reader.rs",
        "entity_store_writer.rs",
        "entity_ref.rs",
        "normalized_entity_repository_reader.rs",
        "normalized_entity_repository_writer.rs",
    ] {
        assert!(store.join(file).is_file(), "missing {file}");
    }
    let repository = fs::read_to_string(store.join("normalized_entity_repository.rs")).unwrap();
    assert!(repository.contains("fn get_message("));
    assert!(repository.contains("::entity_normalizer::reconcile("));
}

#[test]
fn test_diagnostics_fail_the_result() {
    init_logger();
    let input_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = write_model(
        &input_dir,
        r#"
        #[entity_spec(name = "user")]
        pub struct UserSpec { #[entity_id] id: i64 }

        #[entity_spec(name = "orphan")]
        pub struct OrphanSpec { name: String }
        "#,
    );

    let report = generate_file(&input, out_dir.path(), &CodegenConfig::default()).unwrap();
    assert!(!report.written.is_empty());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::MissingId);
    assert_eq!(report.diagnostics[0].spec_name.as_deref(), Some("orphan"));

    let Err(CodegenError::Diagnostics(diagnostics)) = report.into_result() else {
        panic!("expected diagnostics");
    };
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_unformatted_output() {
    let input_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = write_model(&input_dir, MODEL);
    let config = CodegenConfig::builder().format_output(false).build();

    generate_file(&input, out_dir.path(), &config).unwrap().into_result().unwrap();
    let user = fs::read_to_string(out_dir.path().join("user").join("user.rs")).unwrap();
    assert!(user.contains("pub struct User {"));
    assert!(!user.contains("\n    user_id: i64,\n"));
}

#[test]
fn test_missing_input() {
    let out_dir = tempfile::tempdir().unwrap();
    let missing = out_dir.path().join("nope.rs");
    let error = generate_file(&missing, out_dir.path(), &CodegenConfig::default()).unwrap_err();
    assert!(matches!(error, CodegenError::Read { .. }));
}

#[test]
fn test_unparsable_input() {
    let input_dir = tempfile::tempdir().unwrap();
    let input = write_model(&input_dir, "pub struct {");
    let error = generate_file(&input, input_dir.path(), &CodegenConfig::default()).unwrap_err();
    assert!(matches!(error, CodegenError::Parse { .. }));
    assert!(error.to_string().contains("model.rs"));
}
