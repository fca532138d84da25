//! Logging and output control
//!
//! This module provides the [`Logger`] for controlling output verbosity and for
//! emitting structured operation traces (`registry.blob.check url=... digest=...`).
//! A logger built with [`Logger::capture`] records every line in memory instead
//! of printing it, which is how the test suite observes traces.

use std::sync::{Arc, Mutex};

/// Logger responsible for all user-visible output
#[derive(Debug, Clone, Default)]
pub struct Logger {
    pub verbose: bool,
    pub quiet: bool,
    /// Send every line to stderr, leaving stdout for data
    pub stderr_only: bool,
    captured: Option<Arc<Mutex<Vec<String>>>>,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            quiet: false,
            stderr_only: false,
            captured: None,
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
            stderr_only: false,
            captured: None,
        }
    }

    /// Verbose logger that keeps lines in memory instead of printing them
    pub fn capture() -> Self {
        Self {
            verbose: true,
            quiet: false,
            stderr_only: false,
            captured: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Same logger, but with all output moved to stderr
    pub fn with_stderr_only(mut self) -> Self {
        self.stderr_only = true;
        self
    }

    /// Lines recorded by a capturing logger, oldest first
    pub fn captured_lines(&self) -> Vec<String> {
        match &self.captured {
            Some(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn emit(&self, line: String, to_stderr: bool) {
        if let Some(lines) = &self.captured {
            if let Ok(mut lines) = lines.lock() {
                lines.push(line);
            }
            return;
        }
        if to_stderr || self.stderr_only {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    /// Structured operation trace, shown only in verbose mode
    pub fn event(&self, name: &str, fields: &[(&str, String)]) {
        if !self.verbose || self.quiet {
            return;
        }
        let mut line = name.to_string();
        for (key, value) in fields {
            line.push_str(&format!(" {}={}", key, value));
        }
        self.emit(line, true);
    }

    /// Information message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.emit(format!("ℹ️  {}", message), false);
        }
    }

    /// Success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.emit(format!("✅ {}", message), false);
        }
    }

    /// Warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.emit(format!("⚠️  WARNING: {}", message), true);
        }
    }

    /// Error message
    pub fn error(&self, message: &str) {
        self.emit(format!("❌ ERROR: {}", message), true);
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        if self.verbose && !self.quiet {
            self.emit(format!("   {}", message), true);
        }
    }

    /// Format file size in human-readable units
    pub fn format_size(&self, bytes: u64) -> String {
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else if bytes < 1024 * 1024 * 1024 {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        } else {
            format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_formats_key_values() {
        let logger = Logger::capture();
        let url = "http://localhost:5000/v2/library/alpine/blobs/sha256:abc";
        logger.event(
            "registry.blob.check",
            &[
                ("url", url.to_string()),
                ("repository", "library/alpine".to_string()),
            ],
        );

        assert_eq!(
            logger.captured_lines(),
            vec![format!(
                "registry.blob.check url={} repository=library/alpine",
                url
            )]
        );
    }

    #[test]
    fn test_events_suppressed_when_not_verbose() {
        let mut logger = Logger::capture();
        logger.verbose = false;
        logger.event(
            "registry.blob.download",
            &[("digest", "sha256:abc".to_string())],
        );
        logger.detail("hidden");
        logger.info("shown");

        assert_eq!(logger.captured_lines(), vec!["ℹ️  shown".to_string()]);
    }

    #[test]
    fn test_clones_share_capture_buffer() {
        let logger = Logger::capture();
        let clone = logger.clone();
        clone.error("boom");
        assert_eq!(logger.captured_lines().len(), 1);
    }

    #[test]
    fn test_format_size() {
        let logger = Logger::new(false);
        assert_eq!(logger.format_size(512), "512 B");
        assert_eq!(logger.format_size(2048), "2.0 KB");
        assert_eq!(logger.format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
