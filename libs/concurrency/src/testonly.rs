//! Setup shared by the tests of all crates in the workspace.
use std::io::IsTerminal as _;

/// Installs a tracing subscriber writing to the test output and, when running
/// under nextest in process-per-test mode, turns panics into aborts.
///
/// Safe to call from every test; only the first call installs anything.
pub fn abort_on_panic() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .with_ansi(std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal())
        .with_line_number(true)
        .try_init();

    // https://nexte.st/book/env-vars.html#environment-variables-nextest-sets
    let under_nextest = std::env::var("NEXTEST").is_ok_and(|v| v == "1")
        && std::env::var("NEXTEST_EXECUTION_MODE").is_ok_and(|v| v == "process-per-test");
    if !under_nextest {
        return;
    }
    tracing::info!("[panic=abort] enabled");
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::abort();
    }));
}
