//! Container liveness probe.
//!
//! Starts the built image, waits for the server to settle, issues one
//! health request and removes the container on every exit path.

use crate::engine::ContainerEngine;
use crate::error::ProbeError;
use crate::outcome::CheckOutcome;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Value of the `status` field a healthy service reports.
pub const HEALTHY: &str = "healthy";

/// One-shot HTTP health request.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// GET `url` and return the parsed JSON body.
    async fn get_health(&self, url: &str, timeout: Duration) -> Result<Value, ProbeError>;
}

/// [`HealthProbe`] over `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn get_health(&self, url: &str, timeout: Duration) -> Result<Value, ProbeError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProbeError::MalformedBody(e.to_string()))
    }
}

/// Interpret a health response body.
pub fn health_outcome(body: &Value) -> CheckOutcome {
    match body.get("status").and_then(Value::as_str) {
        Some(HEALTHY) => CheckOutcome::pass_with(HEALTHY),
        Some(other) => CheckOutcome::fail(format!("health status is '{}'", other)),
        None => CheckOutcome::fail("health response has no status field"),
    }
}

/// Parameters of one probe.
#[derive(Debug, Clone)]
pub struct ProbeTarget<'a> {
    pub image_tag: &'a str,
    pub container_name: &'a str,
    pub port_mapping: String,
    pub health_url: String,
    pub settle_delay: Duration,
    pub timeout: Duration,
}

/// Run the image and probe its health endpoint.
///
/// Any existing container with the same name is removed first. The
/// container is force-removed again before returning, whatever happened.
pub async fn check_container_runs(
    engine: &dyn ContainerEngine,
    probe: &dyn HealthProbe,
    target: &ProbeTarget<'_>,
) -> CheckOutcome {
    remove_quietly(engine, target.container_name).await;
    let outcome = start_and_probe(engine, probe, target).await;
    remove_quietly(engine, target.container_name).await;
    outcome
}

async fn start_and_probe(
    engine: &dyn ContainerEngine,
    probe: &dyn HealthProbe,
    target: &ProbeTarget<'_>,
) -> CheckOutcome {
    match engine
        .run_detached(target.container_name, &target.port_mapping, target.image_tag)
        .await
    {
        Ok(out) if out.success() => {
            debug!(container = target.container_name, id = %out.stdout.trim(), "Container started");
        }
        Ok(out) => {
            let tail = out.stderr_tail(3);
            warn!(
                container = target.container_name,
                exit_code = out.exit_code,
                "Container failed to start"
            );
            return CheckOutcome::fail(format!(
                "container failed to start (exit code {}): {}",
                out.exit_code, tail
            ));
        }
        Err(e) => {
            warn!(container = target.container_name, error = %e, "Container failed to start");
            return CheckOutcome::fail(e.to_string());
        }
    }

    if !target.settle_delay.is_zero() {
        tokio::time::sleep(target.settle_delay).await;
    }

    match probe.get_health(&target.health_url, target.timeout).await {
        Ok(body) => {
            let outcome = health_outcome(&body);
            info!(url = %target.health_url, passed = outcome.passed(), "Health probe answered");
            outcome
        }
        Err(e) => {
            warn!(url = %target.health_url, error = %e, "Health probe failed");
            CheckOutcome::fail(e.to_string())
        }
    }
}

async fn remove_quietly(engine: &dyn ContainerEngine, name: &str) {
    if let Err(e) = engine.remove_container(name).await {
        debug!(container = name, error = %e, "Container removal failed");
    }
}
