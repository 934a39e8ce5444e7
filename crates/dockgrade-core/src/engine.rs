//! Container engine seam.
//!
//! [`ContainerEngine`] names the five build-tool operations a scoring run
//! needs. [`DockerCli`] implements them by shelling out from inside the
//! project directory; tests use [`crate::fakes::FakeEngine`].

use crate::config::ScorerConfig;
use crate::error::RunnerError;
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::path::PathBuf;

/// Operations on the local container engine.
///
/// Each call is attempted once. A returned [`CommandOutput`] may still carry
/// a non-zero exit code; `Err` means the process never completed.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// `--version`; used only to detect that the engine is reachable.
    async fn version(&self) -> Result<CommandOutput, RunnerError>;

    /// `build -t <tag> .` with the project directory as the build context.
    async fn build(&self, tag: &str) -> Result<CommandOutput, RunnerError>;

    /// `images <tag> --format {{.Size}}`
    async fn image_size(&self, tag: &str) -> Result<CommandOutput, RunnerError>;

    /// `run -d --name <name> -p <ports> <tag>`
    async fn run_detached(
        &self,
        name: &str,
        ports: &str,
        tag: &str,
    ) -> Result<CommandOutput, RunnerError>;

    /// `rm -f <name>`
    async fn remove_container(&self, name: &str) -> Result<CommandOutput, RunnerError>;
}

/// Timeouts applied to each engine operation, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTimeouts {
    pub version: u64,
    pub build: u64,
    pub images: u64,
    pub run: u64,
    pub remove: u64,
}

impl From<&ScorerConfig> for EngineTimeouts {
    fn from(config: &ScorerConfig) -> Self {
        Self {
            version: config.version_timeout_secs,
            build: config.build_timeout_secs,
            images: config.images_timeout_secs,
            run: config.run_timeout_secs,
            remove: config.remove_timeout_secs,
        }
    }
}

/// [`ContainerEngine`] backed by the `docker` CLI (or a compatible binary).
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    project_dir: PathBuf,
    timeouts: EngineTimeouts,
}

impl DockerCli {
    pub fn new(
        binary: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        timeouts: EngineTimeouts,
    ) -> Self {
        Self {
            binary: binary.into(),
            project_dir: project_dir.into(),
            timeouts,
        }
    }

    pub fn from_config(config: &ScorerConfig) -> Self {
        Self::new(
            config.engine_binary.clone(),
            config.project_dir.clone(),
            EngineTimeouts::from(config),
        )
    }

    /// Every command runs with the project directory as its working directory.
    fn spec(&self, name: &str, args: &[&str], timeout_secs: u64) -> CommandSpec {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.binary.clone());
        command.extend(args.iter().map(|a| a.to_string()));
        CommandSpec::new(name, command, timeout_secs).in_dir(&self.project_dir)
    }
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn version(&self) -> Result<CommandOutput, RunnerError> {
        let spec = self.spec("version", &["--version"], self.timeouts.version);
        CommandRunner::execute(&spec).await
    }

    async fn build(&self, tag: &str) -> Result<CommandOutput, RunnerError> {
        // Already inside the project directory, so the context is `.`.
        let spec = self.spec("build", &["build", "-t", tag, "."], self.timeouts.build);
        CommandRunner::execute(&spec).await
    }

    async fn image_size(&self, tag: &str) -> Result<CommandOutput, RunnerError> {
        let spec = self.spec(
            "images",
            &["images", tag, "--format", "{{.Size}}"],
            self.timeouts.images,
        );
        CommandRunner::execute(&spec).await
    }

    async fn run_detached(
        &self,
        name: &str,
        ports: &str,
        tag: &str,
    ) -> Result<CommandOutput, RunnerError> {
        let spec = self.spec(
            "run",
            &["run", "-d", "--name", name, "-p", ports, tag],
            self.timeouts.run,
        );
        CommandRunner::execute(&spec).await
    }

    async fn remove_container(&self, name: &str) -> Result<CommandOutput, RunnerError> {
        let spec = self.spec("rm", &["rm", "-f", name], self.timeouts.remove);
        CommandRunner::execute(&spec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(binary: &str) -> DockerCli {
        DockerCli::from_config(
            &ScorerConfig::default()
                .with_engine_binary(binary)
                .with_project_dir(std::env::temp_dir()),
        )
    }

    #[test]
    fn test_spec_prefixes_binary() {
        let spec = cli("docker").spec("rm", &["rm", "-f", "box"], 10);
        assert_eq!(spec.command, vec!["docker", "rm", "-f", "box"]);
        assert_eq!(spec.timeout_secs, 10);
        assert_eq!(spec.cwd, Some(std::env::temp_dir()));
    }

    #[test]
    fn test_timeouts_from_config() {
        let timeouts = EngineTimeouts::from(&ScorerConfig::default());
        assert_eq!(timeouts.build, 300);
        assert_eq!(timeouts.images, 30);
        assert_eq!(timeouts.run, 30);
        assert_eq!(timeouts.remove, 10);
        assert_eq!(timeouts.version, 5);
    }

    #[tokio::test]
    async fn test_missing_engine_binary_fails_to_spawn() {
        let err = cli("dockgrade-no-such-engine").version().await.unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_echo_engine_passes_arguments_through() {
        // `echo` stands in for the engine and prints the arguments it got.
        let out = cli("echo")
            .run_detached("box", "5001:5000", "img")
            .await
            .expect("echo should run");
        assert_eq!(out.stdout.trim(), "run -d --name box -p 5001:5000 img");
    }

    /// Writes an executable engine stand-in that only succeeds when its build
    /// context, resolved from its working directory, contains a Dockerfile.
    #[cfg(unix)]
    fn context_checking_engine(dir: &std::path::Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-engine");
        std::fs::write(
            &script,
            "#!/bin/sh\n[ -f \"$4/Dockerfile\" ] || { echo \"no Dockerfile in $4\" >&2; exit 1; }\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_build_resolves_relative_project_dir_once() {
        let engine_dir = tempfile::tempdir().unwrap();
        let engine = context_checking_engine(engine_dir.path());

        // Relative to the test's working directory, the way `-C app` arrives.
        let project = tempfile::tempdir_in(".").unwrap();
        std::fs::write(project.path().join("Dockerfile"), "FROM scratch\n").unwrap();
        let relative = PathBuf::from(project.path().file_name().unwrap());
        assert!(relative.is_relative());

        let cli = DockerCli::from_config(
            &ScorerConfig::default()
                .with_engine_binary(engine.to_string_lossy())
                .with_project_dir(relative.clone()),
        );
        let out = cli.build("img").await.expect("engine should run");
        assert!(out.success(), "build failed: {}", out.stderr);
    }

    #[tokio::test]
    async fn test_echo_engine_builds_current_dir() {
        let out = cli("echo").build("img").await.expect("echo should run");
        assert_eq!(out.stdout.trim(), "build -t img .");
    }
}
