//! Terminal progress spinner fed by the scheduler's progress channel

use std::io::Write;
use tokio::sync::watch;
use tokio::time::{interval, Duration};

const BRAILLE_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Check if spinner should be displayed
pub fn should_show_spinner() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr()) && !log::log_enabled!(log::Level::Info)
}

/// Simple spinner struct
pub struct ProgressSpinner {
    frame_index: usize,
}

impl ProgressSpinner {
    pub fn new() -> Self {
        Self { frame_index: 0 }
    }

    pub fn tick(&mut self, fraction: f64) {
        let frame = BRAILLE_FRAMES[self.frame_index];
        self.frame_index = (self.frame_index + 1) % BRAILLE_FRAMES.len();

        // Redraw the status line in place
        eprint!("\r{frame} Scanning... {:5.1}%", fraction * 100.0);
        let _ = std::io::stderr().flush();
    }

    pub fn finish(&self) {
        // Blank the whole status line, not just the frame glyph
        eprint!("\r{:24}\r", "");
        let _ = std::io::stderr().flush();
    }
}

/// Run the spinner task until the progress sender is dropped.
///
/// The scheduler publishes composite scan progress (0.0..=1.0) into a watch
/// channel; this task renders it at 10Hz. When the scan finishes the sender
/// side is dropped, `changed()` errors out, and the spinner clears its line.
pub async fn run_spinner(mut progress: watch::Receiver<f64>) {
    if !should_show_spinner() {
        return;
    }

    let mut spinner = ProgressSpinner::new();
    let mut update_interval = interval(Duration::from_millis(100)); // 10Hz

    loop {
        tokio::select! {
            changed = progress.changed() => {
                if changed.is_err() {
                    // Sender dropped: the scan is over
                    spinner.finish();
                    return;
                }
                spinner.tick(*progress.borrow_and_update());
            }

            _ = update_interval.tick() => {
                spinner.tick(*progress.borrow());
            }
        }
    }
}
