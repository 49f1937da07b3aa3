//! Live progress rendering for downloads.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::format::{format_bytes, format_duration};
use super::sample::ProgressSample;

const SPINNER_FRAMES: &[&str] = &["⠁", "⠂", "⠄", "⡀", " ", "√"];
const MIN_COLUMNS: u16 = 30;

/// Receives progress events for one transfer.
///
/// Implementations only observe; nothing they do can change the outcome of the
/// download that drives them.
pub trait ProgressSink {
    /// The response headers arrived and the body is about to stream.
    fn begin(&mut self, total_bytes: u64);

    /// A chunk arrived.
    fn update(&mut self, sample: &ProgressSample);

    /// The body finished streaming.
    fn finish(&mut self, sample: &ProgressSample);

    /// The transfer failed midway.
    fn abandon(&mut self) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn begin(&mut self, _total_bytes: u64) {}
    fn update(&mut self, _sample: &ProgressSample) {}
    fn finish(&mut self, _sample: &ProgressSample) {}
}

/// Progress bar showing speed, ETA and byte counts.
pub struct ProgressPanel {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl ProgressPanel {
    /// Create a panel; a disabled panel renders nothing.
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Enable the panel only on terminals wide enough to draw it.
    ///
    /// `ansi` and `columns` describe stdout, which is where the bar draws.
    pub fn for_terminal(ansi: bool, columns: u16) -> Self {
        Self::new(ansi && columns > MIN_COLUMNS)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.cyan.bold} {msg}\n  [{bar:40.cyan/blue}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_strings(SPINNER_FRAMES)
            .progress_chars("─╴ ")
    }

    fn describe(sample: &ProgressSample) -> String {
        let eta = sample
            .eta()
            .map(format_duration)
            .unwrap_or_else(|| "?".to_string());

        format!(
            "{}/s  {} ETA  {} / {}",
            format_bytes(sample.speed()),
            eta,
            format_bytes(sample.bytes_received as f64),
            format_bytes(sample.total_bytes as f64),
        )
    }
}

impl ProgressSink for ProgressPanel {
    fn begin(&mut self, total_bytes: u64) {
        if !self.enabled {
            return;
        }

        let bar = ProgressBar::with_draw_target(Some(total_bytes), ProgressDrawTarget::stdout());
        bar.set_style(Self::style());
        bar.set_message(format!("0 B / {}", format_bytes(total_bytes as f64)));
        self.bar = Some(bar);
    }

    fn update(&mut self, sample: &ProgressSample) {
        if let Some(bar) = &self.bar {
            bar.set_position(sample.bytes_received);
            bar.set_message(Self::describe(sample));
            bar.tick();
        }
    }

    fn finish(&mut self, sample: &ProgressSample) {
        if let Some(bar) = self.bar.take() {
            bar.set_position(sample.bytes_received);
            bar.finish_with_message(format!(
                "{} in {}",
                format_bytes(sample.bytes_received as f64),
                format_duration(sample.elapsed)
            ));
        }
    }

    fn abandon(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_panel_disabled_on_narrow_terminal() {
        assert!(!ProgressPanel::for_terminal(true, 30).is_enabled());
        assert!(!ProgressPanel::for_terminal(false, 200).is_enabled());
        assert!(ProgressPanel::for_terminal(true, 31).is_enabled());
    }

    #[test]
    fn test_disabled_panel_ignores_events() {
        let mut panel = ProgressPanel::new(false);
        let sample = ProgressSample::new(10, 10, Duration::from_millis(5));
        panel.begin(10);
        panel.update(&sample);
        panel.finish(&sample);
        assert!(panel.bar.is_none());
    }

    #[test]
    fn test_enabled_panel_tracks_transfer() {
        let mut panel = ProgressPanel::new(true);
        panel.begin(4096);
        let bar = panel.bar.clone().unwrap();
        assert_eq!(bar.length(), Some(4096));

        panel.update(&ProgressSample::new(1024, 4096, Duration::from_millis(5)));
        assert_eq!(bar.position(), 1024);

        panel.abandon();
        assert!(panel.bar.is_none());
    }

    #[test]
    fn test_describe_sample() {
        let sample = ProgressSample::new(1024, 4096, Duration::from_secs(1));
        assert_eq!(
            ProgressPanel::describe(&sample),
            "1 KiB/s  3s ETA  1 KiB / 4 KiB"
        );
    }
}
