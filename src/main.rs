//! Movie Insights - run the analysis once and print the insights.

use anyhow::{Context, Result};
use movie_insights::charts::PlottersRenderer;
use movie_insights::config::AppConfig;
use movie_insights::pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let config = AppConfig::discover(&cwd)?;
    info!(input = %config.input_path.display(), "starting analysis");

    let mut renderer = PlottersRenderer::new(config.style.clone())
        .with_output_dir(config.output_dir.clone())
        .with_open_charts(config.open_charts);

    let insights = pipeline::run(&config.input_path, &mut renderer)
        .with_context(|| format!("Analysis of {} failed", config.input_path.display()))?;

    info!(charts = renderer.rendered().len(), "analysis complete");
    for line in &insights {
        println!("{}", line);
    }
    Ok(())
}
