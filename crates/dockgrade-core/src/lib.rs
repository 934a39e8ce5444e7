//! dockgrade - containerization rubric scoring
//!
//! Scores a project's `Dockerfile`, `.dockerignore` and
//! `docker-compose.yml` against a fixed rubric:
//! - Static file checks (multi-stage, slim base, non-root user, ...)
//! - Image build through the container engine
//! - Image size budget and a container liveness probe
//! - Weighted summary and terminal report

pub mod config;
pub mod engine;
pub mod error;
pub mod fakes;
pub mod image;
pub mod inspect;
pub mod outcome;
pub mod probe;
pub mod report;
pub mod rubric;
pub mod runner;
pub mod scorer;
pub mod telemetry;

// Re-export key types
pub use config::ScorerConfig;
pub use engine::{ContainerEngine, DockerCli};
pub use error::{Result, ScorerError};
pub use outcome::{CheckOutcome, CheckResult};
pub use probe::{HealthProbe, HttpHealthProbe};
pub use report::{Renderer, ScoreSummary, Scorecard, Tier};
pub use rubric::{CheckId, RUBRIC};
pub use scorer::{RunMode, Scorer};
pub use telemetry::init_tracing;
