//! Build progress and results on stderr.

use std::path::Path;

use console::{Style, Term};
use rocket_config::Config;
use rocket_site::BuildReport;

/// Writes build messages to stderr, coloring results.
pub(crate) struct Output {
    term: Term,
    green: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            red: Style::new().red(),
        }
    }

    /// Print where the build reads from and writes to.
    pub(crate) fn locations(&self, config: &Config) {
        if let Some(path) = &config.config_path {
            self.line(&format!("Config: {}", path.display()));
        }
        self.line(&format!("Source: {}", config.root.display()));
        self.line(&format!("Output: {}", config.output_path.display()));
    }

    /// Print the build summary in green.
    pub(crate) fn built(&self, report: &BuildReport, output_dir: &Path) {
        let summary = build_summary(report, output_dir);
        self.line(&self.green.apply_to(summary).to_string());
    }

    /// Print a failure in red.
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.red.apply_to(msg).to_string());
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }
}

fn build_summary(report: &BuildReport, output_dir: &Path) -> String {
    let pages = if report.pages_written == 1 { "page" } else { "pages" };
    format!(
        "Built {} {pages} ({} assets copied, {} unchanged) to {}",
        report.pages_written,
        report.assets_copied,
        report.assets_skipped,
        output_dir.display()
    )
}
