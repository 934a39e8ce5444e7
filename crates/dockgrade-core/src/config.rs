//! Run configuration.
//!
//! Every constant a scoring run depends on lives in [`ScorerConfig`]. The
//! defaults describe the challenge setup; `DOCKGRADE_ENGINE` and
//! `DOCKGRADE_DIR` override the engine binary and project root.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the build tool binary.
pub const ENGINE_ENV: &str = "DOCKGRADE_ENGINE";

/// Environment variable naming the project root.
pub const DIR_ENV: &str = "DOCKGRADE_DIR";

/// Configuration for one scoring run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScorerConfig {
    /// Project root holding `Dockerfile`, `.dockerignore`, `docker-compose.yml`.
    pub project_dir: PathBuf,

    /// Build tool binary.
    pub engine_binary: String,

    /// Tag given to the built image.
    pub image_tag: String,

    /// Name of the probe container.
    pub container_name: String,

    /// Host side of the port mapping.
    pub host_port: u16,

    /// Port the service listens on inside the container.
    pub container_port: u16,

    /// Path of the health endpoint.
    pub health_path: String,

    /// Image size budget in megabytes (exclusive).
    pub size_budget_mb: f64,

    /// Timeout for `build`.
    pub build_timeout_secs: u64,

    /// Timeout for `images`.
    pub images_timeout_secs: u64,

    /// Timeout for `run -d`.
    pub run_timeout_secs: u64,

    /// Timeout for `rm -f`.
    pub remove_timeout_secs: u64,

    /// Timeout for the `--version` availability probe.
    pub version_timeout_secs: u64,

    /// Wait between container start and the health request.
    pub settle_delay_secs: u64,

    /// Timeout for the health request.
    pub probe_timeout_secs: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig {
            project_dir: PathBuf::from("."),
            engine_binary: "docker".to_string(),
            image_tag: "docker-challenge-test".to_string(),
            container_name: "docker-challenge-test-container".to_string(),
            host_port: 5001,
            container_port: 5000,
            health_path: "/health".to_string(),
            size_budget_mb: 200.0,
            build_timeout_secs: 300,
            images_timeout_secs: 30,
            run_timeout_secs: 30,
            remove_timeout_secs: 10,
            version_timeout_secs: 5,
            settle_delay_secs: 3,
            probe_timeout_secs: 5,
        }
    }
}

impl ScorerConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(engine) = std::env::var(ENGINE_ENV) {
            if !engine.trim().is_empty() {
                config.engine_binary = engine;
            }
        }
        if let Ok(dir) = std::env::var(DIR_ENV) {
            if !dir.trim().is_empty() {
                config.project_dir = PathBuf::from(dir);
            }
        }
        config
    }

    /// Set the project root.
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    /// Set the build tool binary.
    pub fn with_engine_binary(mut self, binary: impl Into<String>) -> Self {
        self.engine_binary = binary.into();
        self
    }

    /// Set the settle delay.
    pub fn with_settle_delay_secs(mut self, secs: u64) -> Self {
        self.settle_delay_secs = secs;
        self
    }

    /// `http://localhost:<host_port><health_path>`
    pub fn health_url(&self) -> String {
        format!("http://localhost:{}{}", self.host_port, self.health_path)
    }

    /// `<host_port>:<container_port>`
    pub fn port_mapping(&self) -> String {
        format!("{}:{}", self.host_port, self.container_port)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_challenge_setup() {
        let config = ScorerConfig::default();
        assert_eq!(config.engine_binary, "docker");
        assert_eq!(config.image_tag, "docker-challenge-test");
        assert_eq!(config.container_name, "docker-challenge-test-container");
        assert_eq!(config.build_timeout_secs, 300);
        assert_eq!(config.settle_delay_secs, 3);
        assert_eq!(config.probe_timeout_secs, 5);
    }

    #[test]
    fn test_health_url_and_port_mapping() {
        let config = ScorerConfig::default();
        assert_eq!(config.health_url(), "http://localhost:5001/health");
        assert_eq!(config.port_mapping(), "5001:5000");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ScorerConfig::default()
            .with_project_dir("/tmp/project")
            .with_engine_binary("podman")
            .with_settle_delay_secs(0);
        assert_eq!(config.project_dir, PathBuf::from("/tmp/project"));
        assert_eq!(config.engine_binary, "podman");
        assert_eq!(config.settle_delay(), Duration::ZERO);
    }
}
