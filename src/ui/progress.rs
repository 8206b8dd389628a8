//! Progress spinner with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A task spinner; plain lines when not on a terminal
pub struct TaskSpinner {
    bar: Option<ProgressBar>,
}

impl TaskSpinner {
    /// Start a spinner with a message
    pub fn start(ctx: &UiContext, message: &str) -> Self {
        if !ctx.use_fancy_output() {
            println!("... {}", message);
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}  {elapsed:.dim}")
        {
            bar.set_style(spinner_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar: Some(bar) }
    }

    /// Stop with success message
    pub fn stop(self, message: &str) {
        match self.bar {
            Some(bar) => bar.finish_with_message(format!("{} {}", style("✓").green(), message)),
            None => println!("[OK] {}", message),
        }
    }

    /// Stop with error message
    pub fn stop_error(self, message: &str) {
        match self.bar {
            Some(bar) => bar.abandon_with_message(format!("{} {}", style("✗").red(), message)),
            None => println!("[FAIL] {}", message),
        }
    }
}
