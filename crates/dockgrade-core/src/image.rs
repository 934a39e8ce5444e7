//! Built-image inspection: size lookup and budget comparison.

use crate::engine::ContainerEngine;
use crate::error::SizeFormatError;
use crate::outcome::CheckOutcome;
use tracing::{info, warn};

const MB_PER_GB: f64 = 1024.0;

/// Parse a human-readable size such as `142MB` or `1.2GB` into megabytes.
pub fn parse_size_mb(size: &str) -> Result<f64, SizeFormatError> {
    let size = size.trim();
    let (number, factor) = if let Some(n) = size.strip_suffix("GB") {
        (n, MB_PER_GB)
    } else if let Some(n) = size.strip_suffix("MB") {
        (n, 1.0)
    } else {
        return Err(SizeFormatError::UnknownUnit(size.to_string()));
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| SizeFormatError::InvalidNumber(size.to_string()))?;
    Ok(value * factor)
}

/// Compare a size string against the budget. The detail is always set.
pub fn size_outcome(size: &str, budget_mb: f64) -> CheckOutcome {
    match parse_size_mb(size) {
        Ok(mb) if mb < budget_mb => CheckOutcome::pass_with(size),
        Ok(_) => CheckOutcome::fail(size),
        Err(e) => CheckOutcome::fail(e.to_string()),
    }
}

/// Query the engine for the image size and check it against the budget.
pub async fn check_image_size(
    engine: &dyn ContainerEngine,
    tag: &str,
    budget_mb: f64,
) -> CheckOutcome {
    let output = match engine.image_size(tag).await {
        Ok(output) => output,
        Err(e) => {
            warn!(tag, error = %e, "Image size query failed");
            return CheckOutcome::fail(e.to_string());
        }
    };

    let size = output.stdout.lines().map(str::trim).find(|l| !l.is_empty());
    match size {
        Some(size) if output.success() => {
            info!(tag, size, "Image size");
            size_outcome(size, budget_mb)
        }
        _ => CheckOutcome::fail("Image not found"),
    }
}
