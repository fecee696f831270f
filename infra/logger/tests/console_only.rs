use mxp_logger::{LevelFilter, Logger};

#[test]
fn init_stderr_only_has_no_file_writer() {
    let logger = Logger::builder()
        .name("integration-stderr-only")
        .ansi(false)
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    assert!(!logger.writes_files(), "stderr-only logger should not start a file writer");
}
