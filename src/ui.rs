//! Terminal output helpers
//!
//! Status lines use a colored one-character prefix; long-running network
//! phases get an indicatif spinner that is always cleared before the final
//! status (or error) line is printed.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

pub fn success(message: &str) {
    println!("{} {}", Style::new().green().apply_to("✓"), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", Style::new().red().apply_to("✗"), message);
}

pub fn warn(message: &str) {
    println!("{} {}", Style::new().yellow().apply_to("⚠"), message);
}

pub fn info(message: &str) {
    println!("{} {}", Style::new().blue().apply_to("ℹ"), message);
}

/// Create a spinner for a network phase
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Clear a spinner and print a success line
pub fn spinner_success(pb: &ProgressBar, message: &str) {
    pb.finish_and_clear();
    success(message);
}

/// Clear a spinner and print an error line
pub fn spinner_fail(pb: &ProgressBar, message: &str) {
    pb.finish_and_clear();
    error(message);
}
