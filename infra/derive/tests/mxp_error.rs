use mxp_derive::mxp_error;
use std::borrow::Cow;

#[mxp_error]
pub enum DemoError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid expiry{}: {message}", format_context(.context))]
    InvalidExpiry { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open_missing() -> Result<(), DemoError> {
    let res: Result<(), std::io::Error> =
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
    res?;
    Ok(())
}

#[test]
fn mxp_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/mxp_error_pass.rs");
}

#[test]
fn source_converts_through_question_mark() {
    let err = open_missing().expect_err("expected an io error");
    assert!(matches!(err, DemoError::Io { context: None, .. }));
    assert_eq!(err.to_string(), "I/O failure: gone");
}

#[test]
fn context_is_attached_to_source_results() {
    let res: Result<(), std::io::Error> =
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
    let err = res.context("Opening store").expect_err("expected an io error");
    assert_eq!(err.to_string(), "I/O failure (Opening store): denied");
}

#[test]
fn context_overrides_existing_error() {
    let res: Result<(), DemoError> = Err(DemoError::InvalidExpiry {
        message: "not-a-date".into(),
        context: None,
    });
    let err = res.context("set").expect_err("expected an expiry error");
    assert_eq!(err.to_string(), "Invalid expiry (set): not-a-date");
}

#[test]
fn internal_accepts_plain_messages() {
    let err: DemoError = "boom".into();
    assert!(matches!(err, DemoError::Internal { .. }));
    let err: DemoError = String::from("bang").into();
    assert_eq!(err.to_string(), "Internal error: bang");
}
