//! The scoring rubric: a fixed, ordered list of weighted checks.

use serde::{Deserialize, Serialize};

/// Every check in the rubric, in scoring order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    DockerfileExists,
    MultiStage,
    SlimBase,
    NonRootUser,
    HealthCheck,
    DockerIgnore,
    ComposeValid,
    ImageBuilds,
    ImageSize,
    ContainerRuns,
}

/// How a check is evaluated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// File inspection, no external process.
    Static,
    /// The image build itself.
    Build,
    /// Only attempted after a successful build.
    Gated,
}

impl CheckId {
    /// Static checks, in order.
    pub const STATIC: [CheckId; 7] = [
        CheckId::DockerfileExists,
        CheckId::MultiStage,
        CheckId::SlimBase,
        CheckId::NonRootUser,
        CheckId::HealthCheck,
        CheckId::DockerIgnore,
        CheckId::ComposeValid,
    ];

    /// Display name; the unique key of the check.
    pub fn name(&self) -> &'static str {
        match self {
            CheckId::DockerfileExists => "Dockerfile exists",
            CheckId::MultiStage => "Multi-stage build",
            CheckId::SlimBase => "Uses slim base image",
            CheckId::NonRootUser => "Non-root user",
            CheckId::HealthCheck => "Health check defined",
            CheckId::DockerIgnore => ".dockerignore exists",
            CheckId::ComposeValid => "docker-compose.yml valid",
            CheckId::ImageBuilds => "Image builds successfully",
            CheckId::ImageSize => "Image size < 200MB",
            CheckId::ContainerRuns => "Container runs and responds",
        }
    }

    /// Point value.
    pub fn points(&self) -> u32 {
        match self {
            CheckId::DockerfileExists => 5,
            CheckId::MultiStage => 15,
            CheckId::SlimBase => 10,
            CheckId::NonRootUser => 15,
            CheckId::HealthCheck => 10,
            CheckId::DockerIgnore => 5,
            CheckId::ComposeValid => 15,
            CheckId::ImageBuilds => 10,
            CheckId::ImageSize => 10,
            CheckId::ContainerRuns => 5,
        }
    }

    pub fn kind(&self) -> CheckKind {
        match self {
            CheckId::ImageBuilds => CheckKind::Build,
            CheckId::ImageSize | CheckId::ContainerRuns => CheckKind::Gated,
            _ => CheckKind::Static,
        }
    }
}

/// The full rubric in scoring order.
pub const RUBRIC: [CheckId; 10] = [
    CheckId::DockerfileExists,
    CheckId::MultiStage,
    CheckId::SlimBase,
    CheckId::NonRootUser,
    CheckId::HealthCheck,
    CheckId::DockerIgnore,
    CheckId::ComposeValid,
    CheckId::ImageBuilds,
    CheckId::ImageSize,
    CheckId::ContainerRuns,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rubric_totals_one_hundred() {
        let total: u32 = RUBRIC.iter().map(CheckId::points).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_static_checks_total_seventy_five() {
        let sum: u32 = CheckId::STATIC.iter().map(CheckId::points).sum();
        assert_eq!(sum, 75);
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = RUBRIC.iter().map(CheckId::name).collect();
        assert_eq!(names.len(), RUBRIC.len());
    }

    #[test]
    fn test_gated_checks_cover_placeholder_points() {
        let gated: u32 = RUBRIC
            .iter()
            .filter(|id| id.kind() == CheckKind::Gated)
            .map(CheckId::points)
            .sum();
        assert_eq!(gated, 15);
    }
}
