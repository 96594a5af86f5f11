use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use hollywood_core::core_api::{CoreErrorCode, Engine};
use hollywood_core::fields::FieldId;
use hollywood_core::persist::backup_path;
use hollywood_core::policy::ActivePolicy;
use hollywood_core::studio::Studio;
use tempfile::TempDir;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn save_path(name: &str) -> PathBuf {
    workspace_root().join(format!("tests/saves/{name}.json"))
}

/// Copies a fixture into a fresh temp dir so saves never touch the checked-in file.
fn stage_fixture(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join(format!("{name}.json"));
    fs::copy(save_path(name), &path).expect("failed to stage fixture");
    (dir, path)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e))
}

#[test]
fn unchanged_save_is_byte_identical() {
    let (_dir, path) = stage_fixture("studio_unlocked");
    let original = fs::read(&path).unwrap();

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    let report = session.save().expect("save should succeed");

    assert!(report.changed.is_empty());
    assert_eq!(fs::read(&path).unwrap(), original);
    assert_eq!(fs::read(&report.backup_path).unwrap(), original);
    assert_eq!(report.backup_path, backup_path(&path));
}

#[test]
fn budget_edit_matches_expected_output_and_backup() {
    let (_dir, path) = stage_fixture("studio_locked");
    let original = read(&path);

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_field(FieldId::Budget, "2000").unwrap();
    let report = session.save().expect("save should succeed");

    assert_eq!(report.changed, vec!["budget".to_string()]);
    assert_eq!(
        read(&path),
        "{\"budget\":2000,\"cash\":50,\"reputation\":\"3.200\",\"influence\":2,\
         \"ownedCinemas\":{\"GB\":1,\"EM\":0,\"SU\":0,\"HE\":0,\"MA\":0,\"PL\":2},\
         \"allCinemas\":10,\"Policy\":false}\n"
    );
    assert_eq!(read(&backup_path(&path)), original);
    assert_eq!(session.snapshot().value(FieldId::Budget), "2000");
}

#[test]
fn saving_twice_is_idempotent() {
    let (_dir, path) = stage_fixture("studio_pretty");

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_field(FieldId::Cash, "125").unwrap();
    session.set_field(FieldId::Reputation, "2.5").unwrap();
    session.save().expect("first save should succeed");
    let first = read(&path);

    session.set_field(FieldId::Cash, "125").unwrap();
    session.set_field(FieldId::Reputation, "2.5").unwrap();
    let report = session.save().expect("second save should succeed");
    let second = read(&path);

    assert_eq!(first, second);
    assert_eq!(read(&report.backup_path), first);
    assert!(report.changed.is_empty());
}

#[test]
fn pretty_printed_layout_survives_rewrite() {
    let (_dir, path) = stage_fixture("studio_pretty");

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_field(FieldId::Cash, "125").unwrap();
    session.set_field(FieldId::Reputation, "2.5").unwrap();
    session.save().expect("save should succeed");

    let expected = "{\n  \"firstSaveVersion\":\"1.1.0\",\n  \"lastSaveVersion\":\"1.1.7\",\n  \
                    \"budget\":250000,\n  \"cash\":125,\n  \"reputation\":\"2.500\",\n  \
                    \"influence\":0,\n  \"TAG_SLOT_MAX\":3,\n  \"CONTRACT_MOVIES_MAX\":2,\n  \
                    \"CONTRACT_YEARS_MAX\":4,\n  \"allCinemas\":10,\n  \
                    \"ownedCinemas\":{\"GB\":4,\"EM\":0,\"SU\":0,\"HE\":0,\"MA\":0,\"PL\":9},\n  \
                    \"Policy\":true\n}\n";
    assert_eq!(read(&path), expected);
}

#[test]
fn invalid_field_leaves_file_and_backup_untouched() {
    let (_dir, path) = stage_fixture("studio_unlocked");
    let original = read(&path);

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_field(FieldId::Budget, "9999").unwrap();
    session.set_field(FieldId::Cash, "1").unwrap();
    session.set_field(FieldId::Reputation, "lots").unwrap();

    let err = session.save().expect_err("invalid reputation must block the save");
    assert_eq!(err.code, CoreErrorCode::Validation);
    assert_eq!(err.field.as_deref(), Some("reputation"));
    assert_eq!(read(&path), original);
    assert!(!backup_path(&path).exists());
}

#[test]
fn ownership_edit_without_block_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_owned.json");
    let original = "{\"budget\":10,\"allCinemas\":3}\n";
    fs::write(&path, original).unwrap();

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    assert!(!session.capabilities().can_edit_ownership);
    session.save().expect("all-zero ownership needs no block");
    assert_eq!(read(&path), original);

    session.set_owned_cinemas(Studio::MA, "2");
    let err = session.save().expect_err("no block to rewrite");
    assert_eq!(err.code, CoreErrorCode::Structure);
    assert_eq!(read(&path), original);
}

#[test]
fn policy_edit_is_persisted_when_unlocked() {
    let (_dir, path) = stage_fixture("studio_unlocked");

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_active_policy(ActivePolicy::Conveyor);
    let report = session.save().expect("save should succeed");

    assert_eq!(report.changed, vec!["ACTIVE_POLICY".to_string()]);
    assert!(read(&path).contains(r#""ACTIVE_POLICY":"POLICY_CONVEYOR""#));
    assert!(read(&report.backup_path).contains(r#""ACTIVE_POLICY":"POLICY_BOUTIQUE""#));

    let reopened = Engine::new().open_path(&path).expect("failed to reopen save");
    assert_eq!(reopened.active_policy(), Some(&ActivePolicy::Conveyor));
}

#[test]
fn locked_policy_save_never_introduces_policy_key() {
    let (_dir, path) = stage_fixture("studio_locked");

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_active_policy(ActivePolicy::Trash);
    session.save().expect("save should succeed");

    assert!(!read(&path).contains("ACTIVE_POLICY"));
}

#[test]
fn failed_backup_aborts_save() {
    let (_dir, path) = stage_fixture("studio_locked");
    let original = fs::read(&path).unwrap();
    fs::create_dir(backup_path(&path)).unwrap();

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_field(FieldId::Budget, "2000").unwrap();
    let err = session.save().expect_err("backup target is a directory");

    assert_eq!(err.code, CoreErrorCode::Io);
    assert_eq!(fs::read(&path).unwrap(), original);
    assert_eq!(session.field(FieldId::Budget), "2000");
}

#[test]
fn backup_keeps_original_modification_time() {
    let (_dir, path) = stage_fixture("studio_unlocked");
    let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(modified)
        .unwrap();

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_field(FieldId::Cash, "1").unwrap();
    let report = session.save().expect("save should succeed");

    let backup_modified = fs::metadata(&report.backup_path)
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(backup_modified, modified);
}

#[cfg(unix)]
#[test]
fn read_only_save_can_still_be_saved() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = stage_fixture("studio_locked");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.set_field(FieldId::Cash, "75").unwrap();
    let report = session.save().expect("save should succeed");

    assert!(read(&path).contains(r#""cash":75"#));
    assert!(read(&report.backup_path).contains(r#""cash":50"#));
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o444);
}

#[cfg(unix)]
#[test]
fn save_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = stage_fixture("studio_locked");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

    let mut session = Engine::new().open_path(&path).expect("failed to open save");
    session.save().expect("save should succeed");

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}
