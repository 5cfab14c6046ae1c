use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::cli::OutputFormat;
use crate::pipeline::{RunReport, Stage, StageObserver, StageOutcome};

/// Terminal spinner shown while a stage's call is in flight
pub struct SpinnerObserver {
    progress: ProgressBar,
}

impl SpinnerObserver {
    pub fn new(quiet: bool) -> Self {
        let progress = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        Self { progress }
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

impl StageObserver for SpinnerObserver {
    fn stage_started(&self, stage: Stage) {
        self.progress.reset_elapsed();
        self.progress.set_message(stage.activity());
        self.progress.enable_steady_tick(Duration::from_millis(100));
    }

    fn stage_finished(&self, stage: Stage, outcome: &StageOutcome) {
        self.progress.disable_steady_tick();
        let mark = if outcome.is_ok() {
            style("✓").green()
        } else {
            style("✗").red()
        };
        self.progress.println(format!("{} {}", mark, stage.activity().trim_end_matches("...")));
    }
}

/// Render a report as plain text: messages first, then each panel
pub fn format_as_text(report: &RunReport, styled: bool) -> String {
    let mut out = String::new();

    for notice in &report.notices {
        if styled {
            out.push_str(&format!("{}\n\n", style(&notice.message).red().bold()));
        } else {
            out.push_str(&format!("[{:?}] {}\n\n", notice.kind, notice.message));
        }
    }

    for panel in report.panels() {
        let heading = if styled {
            style(&panel.title).cyan().bold().to_string()
        } else {
            panel.title.clone()
        };
        let underline = "=".repeat(panel.title.chars().count());
        out.push_str(&format!("{}\n{}\n{}\n\n", heading, underline, panel.body));
    }

    out.trim_end().to_string()
}

pub fn format_as_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Save a report to file
pub async fn save_to_file(report: &RunReport, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Text => format_as_text(report, false),
        OutputFormat::Json => format_as_json(report)?,
    };

    fs_err::write(path, content)?;
    Ok(())
}

/// Write a completed report to `path` or the console.
///
/// A fatal run has no panels, so nothing is written and its message is
/// returned as the error instead.
pub async fn deliver(report: &RunReport, path: Option<&Path>, format: &OutputFormat) -> Result<()> {
    if let Some(notice) = report.notices.iter().find(|n| n.kind.is_fatal()) {
        anyhow::bail!("{}", notice.message);
    }

    match path {
        Some(path) => {
            save_to_file(report, path, format).await?;
            println!("Results saved to: {}", path.display());
        }
        None => print_to_console(report, format)?,
    }
    Ok(())
}

/// Print a report to the console
pub fn print_to_console(report: &RunReport, format: &OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Text => format_as_text(report, console::colors_enabled()),
        OutputFormat::Json => format_as_json(report)?,
    };

    println!("{}", content);
    Ok(())
}
