//! dockgrade - score a containerized Python app against the challenge rubric
//!
//! With no flags every check runs. `--build` runs only the image build,
//! size and liveness checks.

use anyhow::{Context, Result};
use clap::Parser;
use dockgrade_core::{
    init_tracing, Renderer, RunMode, Scorecard, Scorer, ScorerConfig, ScorerError,
};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "dockgrade")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check your progress on the Dockerize Python App challenge", long_about = None)]
struct Cli {
    /// Build and test the image only (skip file checks)
    #[arg(long)]
    build: bool,

    /// Project directory containing the Dockerfile
    #[arg(short = 'C', long = "dir", env = "DOCKGRADE_DIR")]
    dir: Option<PathBuf>,

    /// Container engine binary
    #[arg(long, env = "DOCKGRADE_ENGINE")]
    engine: Option<String>,

    /// Also write the scorecard as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Exit with an error when the score is below this percentage
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    min_score: Option<u32>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> ScorerConfig {
        let mut config = ScorerConfig::from_env();
        if let Some(dir) = &self.dir {
            config = config.with_project_dir(dir.clone());
        }
        if let Some(engine) = &self.engine {
            config = config.with_engine_binary(engine.clone());
        }
        config
    }

    fn mode(&self) -> RunMode {
        if self.build {
            RunMode::BuildOnly
        } else {
            RunMode::Full
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let config = cli.config();
    info!(
        dir = %config.project_dir.display(),
        engine = %config.engine_binary,
        "Loaded configuration"
    );

    let renderer = Renderer::new(!cli.no_color);
    let scorer = Scorer::from_config(config);

    let scorecard = match scorer.run(cli.mode()).await {
        Ok(scorecard) => scorecard,
        Err(err @ ScorerError::EngineUnavailable { .. }) => {
            eprint!("{}", renderer.render_engine_missing(&err.to_string()));
            return Err(err).context("cannot score without a container engine");
        }
        Err(err) => return Err(err).context("scoring run failed"),
    };

    print!("{}", renderer.render(&scorecard));
    println!();

    if let Some(path) = &cli.report {
        scorecard
            .write_json(path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Wrote JSON report");
    }

    enforce_min_score(&scorecard, cli.min_score)
}

fn enforce_min_score(scorecard: &Scorecard, min_score: Option<u32>) -> Result<()> {
    let Some(min) = min_score else {
        return Ok(());
    };
    let summary = scorecard.summary();
    if summary.percentage < min {
        anyhow::bail!(
            "score {}% is below the required {}%",
            summary.percentage,
            min
        );
    }
    Ok(())
}
