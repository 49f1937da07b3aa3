//! Status lines for the installer.
//!
//! Every line carries a right-aligned label (`     Success`, `        Info`, ...).
//! Info and unlabelled report lines go to stdout, everything else to stderr.

use console::{style, Color, Term};
use std::io::Write;

const LABEL_WIDTH: usize = 12;

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Output handler for installer status lines
pub struct Output {
    stdout: Term,
    stderr: Term,
    ansi: bool,
    verbosity: Verbosity,
}

impl Output {
    /// Create an output handler; `ansi` decides whether labels are colored.
    pub fn new(ansi: bool) -> Self {
        Self {
            stdout: Term::stdout(),
            stderr: Term::stderr(),
            ansi,
            verbosity: Verbosity::Normal,
        }
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn ansi(&self) -> bool {
        self.ansi
    }

    fn should_output(&self, min_verbosity: Verbosity) -> bool {
        self.verbosity >= min_verbosity
    }

    fn line(&self, label: &str, color: Color, message: &str) -> String {
        let padded = format!("{:>width$}", label, width = LABEL_WIDTH);
        let label = style(padded).fg(color).bold().force_styling(self.ansi);
        format!("{} {}", label, message)
    }

    /// Unlabelled stdout line, silenced by `-q`.
    pub fn writeln(&self, message: &str) {
        if self.should_output(Verbosity::Normal) {
            let _ = writeln!(&self.stdout, "{}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_output(Verbosity::Normal) {
            let _ = writeln!(&self.stderr, "{}", self.line("Success", Color::Green, message));
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_output(Verbosity::Normal) {
            let _ = writeln!(&self.stdout, "{}", self.line("Info", Color::Cyan, message));
        }
    }

    pub fn warn(&self, message: &str) {
        if self.should_output(Verbosity::Quiet) {
            let _ = writeln!(&self.stderr, "{}", self.line("Warn", Color::Yellow, message));
        }
    }

    pub fn error(&self, message: &str) {
        let _ = writeln!(&self.stderr, "{}", self.line("Error", Color::Red, message));
    }

    /// Detail only shown with `-v`
    pub fn verbose(&self, message: &str) {
        if self.should_output(Verbosity::Verbose) {
            let _ = writeln!(&self.stdout, "{}", style(message).dim().force_styling(self.ansi));
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Verbose);
    }

    #[test]
    fn test_plain_line_is_right_aligned() {
        let output = Output::new(false);
        assert_eq!(
            output.line("Success", Color::Green, "Installation complete"),
            "     Success Installation complete"
        );
        assert_eq!(output.line("Info", Color::Cyan, "x"), "        Info x");
    }

    #[test]
    fn test_ansi_line_is_colored() {
        let output = Output::new(true);
        let line = output.line("Error", Color::Red, "boom");
        assert!(line.contains("\u{1b}["));
        assert!(line.ends_with(" boom"));
    }

    #[test]
    fn test_quiet_mode() {
        let mut output = Output::default();
        output.set_verbosity(Verbosity::Quiet);
        assert!(!output.should_output(Verbosity::Normal));
        assert!(output.should_output(Verbosity::Quiet));
    }

    #[test]
    fn test_report_lines_follow_normal_verbosity() {
        let mut output = Output::default();
        assert!(output.should_output(Verbosity::Normal));
        output.writeln("shown");

        output.set_verbosity(Verbosity::Quiet);
        assert!(!output.should_output(Verbosity::Normal));
        output.writeln("suppressed");
    }
}
