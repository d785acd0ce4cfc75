//! Terminal status lines: loading, success, error, confirm.
//!
//! The one place that decides how an [`ApiError`] is shown: connectivity
//! kinds get the generic check-your-connection prompt, server-reported
//! failures get their own message.

use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::api::ApiError;

/// Announce a long-running step.
pub fn loading(message: &str) {
    println!("{} {}", "…".dimmed(), message.dimmed());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Dim diagnostic line on stderr; safe to leave on in scripts.
pub fn trace(message: &str) {
    eprintln!("  {}", message.dimmed());
}

/// The generic connectivity prompt.
pub fn network_error() {
    error("cannot reach the training-record server — check the internet connection");
}

/// Show an API failure: generic prompt for connectivity problems, the
/// server's own message otherwise.
pub fn api_error(context: &str, err: &ApiError) {
    if err.is_connectivity() {
        network_error();
    } else {
        error(&format!("{context}: {}", err.message));
    }
}

/// Ask for confirmation on stdin. `assume_yes` (the `--yes` flag)
/// bypasses the prompt.
pub fn confirm(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    print!("{} {} [y/N] ", "?".yellow().bold(), prompt);
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assume_yes_skips_the_prompt() {
        assert!(confirm("proceed?", true));
    }
}
