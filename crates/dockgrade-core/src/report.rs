//! Scorecards, score arithmetic and the terminal report.
//!
//! Skipped checks count toward the denominator with zero points earned, so
//! a failed build still scores out of the full rubric for the mode.

use crate::error::Result;
use crate::outcome::CheckResult;
use crate::rubric::CheckId;
use crate::scorer::RunMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Segments in the progress bar.
pub const BAR_WIDTH: u32 = 20;

/// Aggregate score of one run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreSummary {
    pub earned_points: u32,
    pub total_points: u32,
    pub percentage: u32,
}

/// Display tier of a percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Good,
    Warn,
    Bad,
}

impl ScoreSummary {
    /// `floor(100 * earned / total)`, or 0 when nothing was scored.
    pub fn new(earned_points: u32, total_points: u32) -> Self {
        let percentage = if total_points == 0 {
            0
        } else {
            earned_points * 100 / total_points
        };
        Self {
            earned_points,
            total_points,
            percentage,
        }
    }

    pub fn from_results(results: &[CheckResult]) -> Self {
        let earned = results.iter().map(CheckResult::earned).sum();
        let total = results.iter().map(|r| r.points).sum();
        Self::new(earned, total)
    }

    pub fn tier(&self) -> Tier {
        match self.percentage {
            p if p >= 80 => Tier::Good,
            p if p >= 50 => Tier::Warn,
            _ => Tier::Bad,
        }
    }

    /// Filled segments of the bar.
    pub fn bar_filled(&self) -> u32 {
        (self.percentage / 5).min(BAR_WIDTH)
    }

    /// The proportional bar, e.g. `████████░░░░░░░░░░░░`.
    pub fn bar(&self) -> String {
        let filled = self.bar_filled() as usize;
        let empty = BAR_WIDTH as usize - filled;
        format!("{}{}", "█".repeat(filled), "░".repeat(empty))
    }

    pub fn is_complete(&self) -> bool {
        self.total_points > 0 && self.percentage == 100
    }
}

/// Every result recorded during one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scorecard {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub project_dir: PathBuf,
    /// SHA-256 over the inspected input files.
    pub input_digest: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub results: Vec<CheckResult>,
}

impl Scorecard {
    pub fn start(mode: RunMode, project_dir: &Path, input_digest: String) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode,
            project_dir: project_dir.to_path_buf(),
            input_digest,
            started_at: Utc::now(),
            finished_at: None,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary::from_results(&self.results)
    }

    pub fn result(&self, check: CheckId) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.check == check)
    }

    /// Pretty JSON of the scorecard and its summary.
    pub fn to_json(&self) -> Result<String> {
        let value = serde_json::json!({
            "scorecard": self,
            "summary": self.summary(),
            "tier": self.summary().tier(),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

mod ansi {
    pub const GREEN: &str = "\x1b[92m";
    pub const RED: &str = "\x1b[91m";
    pub const YELLOW: &str = "\x1b[93m";
    pub const CYAN: &str = "\x1b[96m";
    pub const BOLD: &str = "\x1b[1m";
    pub const END: &str = "\x1b[0m";
}

/// Renders a [`Scorecard`] for the terminal.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", code, text, ansi::END)
        } else {
            text.to_string()
        }
    }

    pub fn render(&self, scorecard: &Scorecard) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.paint(ansi::CYAN, &rule));
        let _ = writeln!(
            out,
            "{}",
            self.paint(
                &format!("{}{}", ansi::BOLD, ansi::CYAN),
                "  🐳 Dockerize Python App Challenge"
            )
        );
        let _ = writeln!(out, "{}", self.paint(ansi::CYAN, &rule));

        for result in &scorecard.results {
            match result.check {
                CheckId::DockerfileExists => self.section(&mut out, "Checking files..."),
                CheckId::ImageBuilds => self.section(&mut out, "Building image..."),
                CheckId::ContainerRuns if !result.outcome.is_skipped() => {
                    self.section(&mut out, "Testing container...")
                }
                _ => {}
            }
            self.line(&mut out, result);
        }

        let summary = scorecard.summary();
        self.section(&mut out, "Overall Score:");
        let bar_color = match summary.tier() {
            Tier::Good => ansi::GREEN,
            Tier::Warn => ansi::YELLOW,
            Tier::Bad => ansi::RED,
        };
        let _ = writeln!(
            out,
            "  {} {}/{} pts ({}%)",
            self.paint(bar_color, &summary.bar()),
            summary.earned_points,
            summary.total_points,
            summary.percentage
        );
        let _ = writeln!(out);

        if summary.is_complete() {
            let _ = writeln!(
                out,
                "  {}",
                self.paint(&format!("{}{}", ansi::GREEN, ansi::BOLD), "🎉 CHALLENGE COMPLETE!")
            );
            let _ = writeln!(
                out,
                "  {}",
                self.paint(ansi::CYAN, "You've mastered Docker containerization!")
            );
        } else if summary.percentage >= 70 {
            let _ = writeln!(
                out,
                "  {}",
                self.paint(ansi::YELLOW, "Almost there! Check the hints in README.md")
            );
        } else {
            let _ = writeln!(
                out,
                "  {}",
                self.paint(ansi::YELLOW, "Keep going! See README.md for guidance")
            );
        }
        out
    }

    /// Diagnostic shown when the container engine cannot be reached.
    pub fn render_engine_missing(&self, reason: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {}",
            self.paint(ansi::RED, "❌ Docker is not installed or not running")
        );
        let _ = writeln!(
            out,
            "  {}",
            self.paint(ansi::YELLOW, "Please install Docker Desktop first")
        );
        let _ = writeln!(out, "  ({})", reason);
        let _ = writeln!(out);
        out
    }

    fn section(&self, out: &mut String, title: &str) {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", self.paint(ansi::BOLD, title));
        let _ = writeln!(out);
    }

    fn line(&self, out: &mut String, result: &CheckResult) {
        let pass = self.paint(ansi::GREEN, "✅");
        let fail = self.paint(ansi::RED, "❌");
        let skip = self.paint(ansi::YELLOW, "⏭ ");

        if result.passed() {
            match (result.check, result.detail()) {
                (CheckId::ImageSize, Some(size)) => {
                    let _ = writeln!(
                        out,
                        "  {} {} ({}) ({} pts)",
                        pass, result.name, size, result.points
                    );
                }
                _ => {
                    let _ = writeln!(out, "  {} {} ({} pts)", pass, result.name, result.points);
                }
            }
            return;
        }

        if result.outcome.is_skipped() {
            let _ = writeln!(
                out,
                "  {} {} (0/{} pts, skipped: {})",
                skip,
                result.name,
                result.points,
                result.detail().unwrap_or_default()
            );
            return;
        }

        let _ = writeln!(out, "  {} {} (0/{} pts)", fail, result.name, result.points);
        if let Some(detail) = result.detail() {
            for line in detail.lines() {
                let _ = writeln!(out, "     {}", self.paint(ansi::YELLOW, &format!("→ {}", line)));
            }
        }
        if result.check == CheckId::ImageBuilds {
            let _ = writeln!(
                out,
                "     {}",
                self.paint(ansi::YELLOW, "→ Fix Dockerfile errors first")
            );
        }
    }
}
