//! Shared helpers for editor integration tests

use rosewood_editor::Navigator;

/// Route `tracing` output through the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("rosewood_editor=debug")
        .try_init();
}

pub fn attach(source: &str) -> Navigator {
    init_tracing();
    Navigator::attach(source).expect("source should parse")
}
