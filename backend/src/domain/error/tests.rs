//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case::invalid(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::auth(Error::not_authenticated("who?"), ErrorCode::NotAuthenticated)]
#[case::missing(Error::not_found("gone"), ErrorCode::NotFound)]
#[case::busy(Error::busy("wait"), ErrorCode::Busy)]
#[case::backend(Error::backend("down"), ErrorCode::BackendError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = Error::new(ErrorCode::NotAuthenticated, "");
    assert_eq!(error.message(), "user not authenticated");
}

#[rstest]
fn serialises_code_as_snake_case() {
    let error = Error::backend("store unavailable").with_details(json!({"table": "bottles"}));
    let value = serde_json::to_value(&error).expect("serialise error");

    assert_eq!(value["code"], "backend_error");
    assert_eq!(value["message"], "store unavailable");
    assert_eq!(value["details"]["table"], "bottles");
}

#[rstest]
fn deserialisation_rejects_blank_message() {
    let payload = json!({"code": "not_found", "message": "  "});
    let result: Result<Error, _> = serde_json::from_value(payload);
    assert!(result.is_err());
}

#[rstest]
fn display_uses_message() {
    assert_eq!(Error::busy("edit in flight").to_string(), "edit in flight");
}
