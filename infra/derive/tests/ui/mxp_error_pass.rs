use mxp_derive::mxp_error;
use std::borrow::Cow;

#[mxp_error]
pub enum SnapshotError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Store unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read(path: &str) -> Result<String, SnapshotError> {
    std::fs::read_to_string(path).context("Reading snapshot")
}

fn main() {
    let _ = read("missing.json");
}
