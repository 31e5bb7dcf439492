use std::path::PathBuf;

use tasklog::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let auth = Error::InvalidCredentials;
    assert_eq!(auth.exit_code(), exit_codes::AUTH_ERROR);

    let signed_out = Error::NotSignedIn("add tasks".to_string());
    assert_eq!(signed_out.exit_code(), exit_codes::AUTH_ERROR);

    let op = Error::LockFailed(PathBuf::from("/tmp/db.json.lock"));
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code_and_details() {
    let err = Error::TaskNotFound("task9".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("Task not found"));
    assert_eq!(json.details.expect("details")["task_id"], "task9");
}

#[test]
fn sign_in_messages() {
    assert_eq!(
        Error::InvalidCredentials.to_string(),
        "Invalid email or password combination."
    );
    assert_eq!(
        Error::NotSignedIn("view tasks".to_string()).to_string(),
        "Please log in to view tasks"
    );
}
