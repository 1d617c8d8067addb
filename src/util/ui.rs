/// Print a passing check with checkmark
pub fn success(msg: &str) {
    println!("  ✓ {}", msg);
}

/// Print a failing check with X
pub fn failure(msg: &str) {
    println!("  ✗ {}", msg);
}

/// Print a fatal error to stderr
pub fn error(msg: &str) {
    eprintln!("  ✗ {}", msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("  ⚠ {}", msg);
}

/// Print a dimmed/secondary message, indented under the previous line
pub fn dim(msg: &str) {
    for line in msg.lines() {
        println!("    {}", line);
    }
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg);
}
