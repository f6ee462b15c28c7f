use std::io::Write;

/// Writes straight to stdout so that summaries (like how many nodes a prune removed) show up even when the test passes.
pub fn test_print(message: &str) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    handle.write_all(message.as_bytes()).unwrap();
    handle.flush().unwrap();
}
