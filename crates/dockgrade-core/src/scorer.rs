//! Scoring run orchestration.
//!
//! A run moves through fixed states, each gating the next:
//! engine check, static checks, build attempt, then size and liveness
//! checks. [`RunMode::checks`] decides which of them a run records. Only an
//! unreachable engine aborts the run; every other failure is recorded as a
//! check outcome.

use crate::config::ScorerConfig;
use crate::engine::{ContainerEngine, DockerCli};
use crate::error::{Result, ScorerError};
use crate::image::check_image_size;
use crate::inspect;
use crate::outcome::{CheckOutcome, CheckResult};
use crate::probe::{check_container_runs, HealthProbe, HttpHealthProbe, ProbeTarget};
use crate::report::Scorecard;
use crate::rubric::{CheckId, CheckKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Which part of the rubric to run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// All ten checks.
    #[default]
    Full,
    /// Build, size and liveness checks only.
    BuildOnly,
}

impl RunMode {
    /// Checks this mode can record, in order.
    pub fn checks(&self) -> Vec<CheckId> {
        let gated = [CheckId::ImageBuilds, CheckId::ImageSize, CheckId::ContainerRuns];
        match self {
            RunMode::Full => CheckId::STATIC.iter().chain(gated.iter()).copied().collect(),
            RunMode::BuildOnly => gated.to_vec(),
        }
    }
}

/// Reason recorded on checks gated behind a failed build.
pub const BUILD_FAILED_REASON: &str = "image build failed";

/// Drives one scoring run.
pub struct Scorer {
    config: ScorerConfig,
    engine: Arc<dyn ContainerEngine>,
    probe: Arc<dyn HealthProbe>,
}

impl Scorer {
    pub fn new(
        config: ScorerConfig,
        engine: Arc<dyn ContainerEngine>,
        probe: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            config,
            engine,
            probe,
        }
    }

    /// Scorer using the `docker` CLI and a real HTTP client.
    pub fn from_config(config: ScorerConfig) -> Self {
        let engine = Arc::new(DockerCli::from_config(&config));
        let probe = Arc::new(HttpHealthProbe::default());
        Self::new(config, engine, probe)
    }

    /// Execute the run and return the scorecard.
    ///
    /// Fails only with [`ScorerError::EngineUnavailable`].
    pub async fn run(&self, mode: RunMode) -> Result<Scorecard> {
        self.ensure_engine().await?;

        let mut scorecard = Scorecard::start(
            mode,
            &self.config.project_dir,
            inspect::input_digest(&self.config.project_dir),
        );
        info!(
            run_id = %scorecard.run_id,
            ?mode,
            dir = %self.config.project_dir.display(),
            "Starting scoring run"
        );

        let mut built = false;
        for check in mode.checks() {
            let start = Instant::now();
            let outcome = match check.kind() {
                CheckKind::Static => match inspect::run_static(check, &self.config.project_dir) {
                    Some(outcome) => outcome,
                    None => continue,
                },
                CheckKind::Build => {
                    let outcome = self.build_image().await;
                    built = outcome.passed();
                    outcome
                }
                CheckKind::Gated if !built => {
                    info!(check = check.name(), "Skipping check gated on build");
                    let skipped = CheckOutcome::skip(BUILD_FAILED_REASON);
                    scorecard.record(CheckResult::new(check, skipped, 0));
                    continue;
                }
                CheckKind::Gated if check == CheckId::ImageSize => {
                    check_image_size(
                        self.engine.as_ref(),
                        &self.config.image_tag,
                        self.config.size_budget_mb,
                    )
                    .await
                }
                CheckKind::Gated => {
                    let target = self.probe_target();
                    check_container_runs(self.engine.as_ref(), self.probe.as_ref(), &target).await
                }
            };
            scorecard.record(self.finish(check, outcome, start));
        }

        scorecard.finish();
        let summary = scorecard.summary();
        info!(
            run_id = %scorecard.run_id,
            earned = summary.earned_points,
            total = summary.total_points,
            percentage = summary.percentage,
            "Scoring run finished"
        );
        Ok(scorecard)
    }

    async fn ensure_engine(&self) -> Result<()> {
        match self.engine.version().await {
            Ok(out) => {
                if !out.success() {
                    warn!(exit_code = out.exit_code, "Engine version probe exited non-zero");
                }
                Ok(())
            }
            Err(e) => Err(ScorerError::EngineUnavailable {
                binary: self.config.engine_binary.clone(),
                reason: e.to_string(),
            }),
        }
    }

    async fn build_image(&self) -> CheckOutcome {
        info!(tag = %self.config.image_tag, "Building image");
        match self.engine.build(&self.config.image_tag).await {
            Ok(out) if out.success() => CheckOutcome::pass_with(self.config.image_tag.clone()),
            Ok(out) => {
                let tail = out.stderr_tail(5);
                let detail = if tail.is_empty() {
                    format!("build exited with code {}", out.exit_code)
                } else {
                    format!("build exited with code {}: {}", out.exit_code, tail)
                };
                CheckOutcome::fail(detail)
            }
            Err(e) => CheckOutcome::fail(e.to_string()),
        }
    }

    fn probe_target(&self) -> ProbeTarget<'_> {
        ProbeTarget {
            image_tag: &self.config.image_tag,
            container_name: &self.config.container_name,
            port_mapping: self.config.port_mapping(),
            health_url: self.config.health_url(),
            settle_delay: self.config.settle_delay(),
            timeout: self.config.probe_timeout(),
        }
    }

    fn finish(&self, check: CheckId, outcome: CheckOutcome, start: Instant) -> CheckResult {
        let duration_ms = start.elapsed().as_millis() as u64;
        if outcome.passed() {
            info!(check = check.name(), duration_ms, "Check passed");
        } else {
            info!(
                check = check.name(),
                duration_ms,
                detail = outcome.detail().unwrap_or_default(),
                "Check failed"
            );
        }
        CheckResult::new(check, outcome, duration_ms)
    }
}
