use indicatif::{ProgressBar, ProgressStyle};
use mediacull::ProgressReporter;
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Drives an indicatif bar from library progress callbacks.
///
/// Starts as a spinner while the total is unknown and switches to a bar once
/// the first bounded update arrives.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new(message: &str) -> anyhow::Result<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template(SPINNER_TEMPLATE)?);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { bar })
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl ProgressReporter for TerminalProgress {
    fn report(&self, current: usize, total: Option<usize>, message: &str) {
        if let Some(total) = total {
            if self.bar.length() != Some(total as u64) {
                if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                    self.bar.set_style(style.progress_chars("=>-"));
                }
                self.bar.set_length(total as u64);
            }
            self.bar.set_position(current as u64);
        }
        self.bar.set_message(message.to_string());
    }
}
