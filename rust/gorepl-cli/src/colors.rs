//! ANSI color helpers for REPL output.
//!
//! Colors can be switched off globally (config `color = false` or `NO_COLOR`).

use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn colored output on or off for the whole process.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

fn paint(code: &str, s: &str) -> String {
    if enabled() {
        format!("\x1b[{}m{}\x1b[0m", code, s)
    } else {
        s.to_string()
    }
}

/// Format text in green.
pub fn green(s: &str) -> String {
    paint("32", s)
}

/// Format text in red.
pub fn red(s: &str) -> String {
    paint("31", s)
}

/// Format text in yellow.
pub fn yellow(s: &str) -> String {
    paint("33", s)
}

/// Format text in cyan.
pub fn cyan(s: &str) -> String {
    paint("36", s)
}

/// Format text in bold.
pub fn bold(s: &str) -> String {
    paint("1", s)
}

/// Format text in gray.
pub fn gray(s: &str) -> String {
    paint("90", s)
}
