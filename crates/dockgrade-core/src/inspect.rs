//! Static inspection of the project files.
//!
//! Every inspector is a total function over the filesystem: a missing or
//! unreadable file is a failed check, never an error. Pattern helpers work
//! on `&str` so they can be exercised without touching disk.

use crate::outcome::CheckOutcome;
use crate::rubric::CheckId;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

pub const DOCKERFILE: &str = "Dockerfile";
pub const DOCKERIGNORE: &str = ".dockerignore";
pub const COMPOSE_FILE: &str = "docker-compose.yml";

static FROM_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^FROM[ \t]+(.*)$").expect("FROM pattern is valid"));

static USER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^USER[ \t]+(\S+)").expect("USER pattern is valid"));

/// Run the static check identified by `check` against `root`.
///
/// Returns `None` for checks that are not static.
pub fn run_static(check: CheckId, root: &Path) -> Option<CheckOutcome> {
    let outcome = match check {
        CheckId::DockerfileExists => check_dockerfile_exists(root),
        CheckId::MultiStage => check_multistage(root),
        CheckId::SlimBase => check_slim_base(root),
        CheckId::NonRootUser => check_non_root_user(root),
        CheckId::HealthCheck => check_healthcheck(root),
        CheckId::DockerIgnore => check_dockerignore(root),
        CheckId::ComposeValid => check_compose_valid(root),
        _ => return None,
    };
    Some(outcome)
}

fn read(root: &Path, file: &str) -> Result<String, CheckOutcome> {
    std::fs::read_to_string(root.join(file)).map_err(|e| {
        debug!(file, error = %e, "Could not read input file");
        CheckOutcome::fail(format!("cannot read {}: {}", file, e))
    })
}

fn with_file(root: &Path, file: &str, check: impl FnOnce(&str) -> CheckOutcome) -> CheckOutcome {
    match read(root, file) {
        Ok(content) => check(&content),
        Err(outcome) => outcome,
    }
}

pub fn check_dockerfile_exists(root: &Path) -> CheckOutcome {
    CheckOutcome::from_condition(root.join(DOCKERFILE).exists(), "Dockerfile not found")
}

pub fn check_multistage(root: &Path) -> CheckOutcome {
    with_file(root, DOCKERFILE, |content| {
        let count = count_from_lines(content);
        CheckOutcome::from_condition(
            count >= 2,
            format!("found {} FROM instruction(s), need at least 2", count),
        )
    })
}

pub fn check_slim_base(root: &Path) -> CheckOutcome {
    with_file(root, DOCKERFILE, |content| match final_base_image(content) {
        Some(image) if is_slim_image(&image) => CheckOutcome::pass_with(image),
        Some(image) => CheckOutcome::fail(format!(
            "final stage uses '{}', expected a slim or alpine image",
            image
        )),
        None => CheckOutcome::fail("no FROM instruction"),
    })
}

pub fn check_non_root_user(root: &Path) -> CheckOutcome {
    with_file(root, DOCKERFILE, |content| {
        if !creates_user(content) {
            return CheckOutcome::fail("no useradd/adduser found");
        }
        CheckOutcome::from_condition(
            switches_to_non_root(content),
            "no USER instruction switching to a non-root user",
        )
    })
}

pub fn check_healthcheck(root: &Path) -> CheckOutcome {
    with_file(root, DOCKERFILE, |content| {
        CheckOutcome::from_condition(content.contains("HEALTHCHECK"), "no HEALTHCHECK instruction")
    })
}

pub fn check_dockerignore(root: &Path) -> CheckOutcome {
    with_file(root, DOCKERIGNORE, dockerignore_outcome)
}

pub fn check_compose_valid(root: &Path) -> CheckOutcome {
    with_file(root, COMPOSE_FILE, compose_outcome)
}

/// Number of lines starting with `FROM` followed by whitespace.
pub fn count_from_lines(content: &str) -> usize {
    FROM_LINE.find_iter(content).count()
}

/// Image reference of the last `FROM` line, skipping `--flag` options.
pub fn final_base_image(content: &str) -> Option<String> {
    let last = FROM_LINE.captures_iter(content).last()?;
    last.get(1)?
        .as_str()
        .split_whitespace()
        .find(|token| !token.starts_with("--"))
        .map(str::to_string)
}

pub fn is_slim_image(image: &str) -> bool {
    image.contains("slim") || image.contains("alpine")
}

pub fn creates_user(content: &str) -> bool {
    content.contains("useradd") || content.contains("adduser")
}

/// True when some `USER` line names a user other than `root` or uid `0`.
pub fn switches_to_non_root(content: &str) -> bool {
    USER_LINE.captures_iter(content).any(|caps| {
        let user = caps[1].split(':').next().unwrap_or_default();
        user != "root" && user != "0"
    })
}

fn dockerignore_outcome(content: &str) -> CheckOutcome {
    let has_pycache = content.contains("__pycache__") || content.contains("*.pyc");
    let has_venv = content.contains("venv") || content.contains(".venv");
    match (has_pycache, has_venv) {
        (true, true) => CheckOutcome::pass(),
        (false, true) => CheckOutcome::fail("missing __pycache__ or *.pyc pattern"),
        (true, false) => CheckOutcome::fail("missing venv or .venv pattern"),
        (false, false) => CheckOutcome::fail("missing bytecode cache and virtualenv patterns"),
    }
}

fn compose_outcome(content: &str) -> CheckOutcome {
    if !content.contains("api:") {
        return CheckOutcome::fail("no 'api:' service");
    }
    CheckOutcome::from_condition(content.contains("5000:5000"), "no 5000:5000 port mapping")
}

/// SHA-256 over the three input files, in a fixed order.
///
/// A missing file contributes its name and a marker so that adding an empty
/// file changes the digest.
pub fn input_digest(root: &Path) -> String {
    let mut hasher = Sha256::new();
    for file in [DOCKERFILE, DOCKERIGNORE, COMPOSE_FILE] {
        hasher.update(file.as_bytes());
        hasher.update(b"\0");
        match std::fs::read(root.join(file)) {
            Ok(bytes) => {
                hasher.update(b"present\0");
                hasher.update(&bytes);
            }
            Err(_) => hasher.update(b"missing\0"),
        }
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}
