//! In-memory fakes for the engine and health probe (testing only)
//!
//! `FakeEngine` records every call it receives and answers with canned
//! outputs; `FakeHealthProbe` returns a fixed body or error.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::ContainerEngine;
use crate::error::{ProbeError, RunnerError};
use crate::probe::HealthProbe;
use crate::runner::CommandOutput;

/// A call received by [`FakeEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Version,
    Build(String),
    ImageSize(String),
    Run { name: String, ports: String, tag: String },
    Remove(String),
}

fn output(exit_code: i32, stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        duration_ms: 1,
    }
}

/// Scripted [`ContainerEngine`].
#[derive(Debug)]
pub struct FakeEngine {
    available: bool,
    build_exit: i32,
    build_stderr: String,
    image_size: String,
    run_exit: i32,
    run_stderr: String,
    remove_fails: bool,
    calls: Mutex<Vec<EngineCall>>,
}

impl FakeEngine {
    /// Engine where every operation succeeds and the image is 142MB.
    pub fn healthy() -> Self {
        Self {
            available: true,
            build_exit: 0,
            build_stderr: String::new(),
            image_size: "142MB".to_string(),
            run_exit: 0,
            run_stderr: String::new(),
            remove_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Engine whose binary cannot be spawned.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::healthy()
        }
    }

    pub fn with_build_failure(mut self, stderr: &str) -> Self {
        self.build_exit = 1;
        self.build_stderr = stderr.to_string();
        self
    }

    pub fn with_image_size(mut self, size: &str) -> Self {
        self.image_size = size.to_string();
        self
    }

    pub fn with_run_exit(mut self, exit_code: i32, stderr: &str) -> Self {
        self.run_exit = exit_code;
        self.run_stderr = stderr.to_string();
        self
    }

    pub fn with_remove_error(mut self) -> Self {
        self.remove_fails = true;
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remove_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Remove(_)))
            .count()
    }

    fn record(&self, call: EngineCall) -> Result<(), RunnerError> {
        self.calls.lock().unwrap().push(call);
        if self.available {
            Ok(())
        } else {
            Err(RunnerError::Spawn {
                command: "fake-engine".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn version(&self) -> Result<CommandOutput, RunnerError> {
        self.record(EngineCall::Version)?;
        Ok(output(0, "Docker version 27.0.0, build fake", ""))
    }

    async fn build(&self, tag: &str) -> Result<CommandOutput, RunnerError> {
        self.record(EngineCall::Build(tag.to_string()))?;
        Ok(output(self.build_exit, "", &self.build_stderr))
    }

    async fn image_size(&self, tag: &str) -> Result<CommandOutput, RunnerError> {
        self.record(EngineCall::ImageSize(tag.to_string()))?;
        Ok(output(0, &self.image_size, ""))
    }

    async fn run_detached(
        &self,
        name: &str,
        ports: &str,
        tag: &str,
    ) -> Result<CommandOutput, RunnerError> {
        self.record(EngineCall::Run {
            name: name.to_string(),
            ports: ports.to_string(),
            tag: tag.to_string(),
        })?;
        Ok(output(self.run_exit, "f00dcafe\n", &self.run_stderr))
    }

    async fn remove_container(&self, name: &str) -> Result<CommandOutput, RunnerError> {
        self.record(EngineCall::Remove(name.to_string()))?;
        if self.remove_fails {
            return Err(RunnerError::Timeout {
                command: format!("rm -f {}", name),
                timeout_secs: 10,
            });
        }
        Ok(output(0, name, ""))
    }
}

/// Scripted [`HealthProbe`].
#[derive(Debug)]
pub struct FakeHealthProbe {
    response: Result<Value, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeHealthProbe {
    pub fn responding(body: Value) -> Self {
        Self {
            response: Ok(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            response: Err(error.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HealthProbe for FakeHealthProbe {
    async fn get_health(&self, url: &str, _timeout: Duration) -> Result<Value, ProbeError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.response.clone().map_err(ProbeError::Http)
    }
}
