//! The conversion command

use crate::cli::Cli;
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;
use vault2org_config::{Config, ConversionConfig, ConverterKind};
use vault2org_parser::{CachedConverter, Converter, MarkdownConverter, PandocConverter};
use vault2org_pipeline::{NoopObserver, RunReport, VaultPipeline};

pub fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let converter = build_converter(&config.conversion);
    debug!(
        converter = converter.name(),
        jobs = config.effective_jobs(),
        "configuration resolved"
    );

    let pipeline = VaultPipeline::new(converter, config);
    let report = if cli.no_progress {
        pipeline.run_with_observer(&cli.input, &cli.output, &NoopObserver)
    } else {
        let progress = ProgressReporter::new()?;
        let report = pipeline.run_with_observer(&cli.input, &cli.output, &progress);
        progress.finish();
        report
    }
    .context("conversion failed")?;

    print_summary(&report, cli);
    Ok(())
}

/// Config file values with command line overrides applied
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    if let Some(jobs) = cli.jobs {
        config.jobs = Some(jobs);
    }
    if let Some(converter) = cli.converter {
        config.conversion.converter = converter;
    }
    if let Some(pandoc) = &cli.pandoc {
        config.conversion.pandoc_path = pandoc.clone();
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.conversion.cache_dir = Some(cache_dir.clone());
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// The configured converter, wrapped in the cache when one is set
pub fn build_converter(conversion: &ConversionConfig) -> Arc<dyn Converter> {
    let converter: Box<dyn Converter> = match conversion.converter {
        ConverterKind::Builtin => Box::new(MarkdownConverter::new()),
        ConverterKind::Pandoc => Box::new(
            PandocConverter::new(conversion.pandoc_path.clone())
                .with_extra_args(conversion.pandoc_args.clone()),
        ),
    };

    match &conversion.cache_dir {
        Some(dir) => Arc::new(CachedConverter::new(converter, dir.clone())),
        None => Arc::from(converter),
    }
}

fn print_summary(report: &RunReport, cli: &Cli) {
    println!("\nConversion complete: {report}");
    println!("   Output: {}", cli.output.display());
    if report.excluded > 0 {
        println!("   Excluded by discovery rules: {} files", report.excluded);
    }

    let problems = report.problems();
    if !problems.is_empty() {
        println!("   Notes not converted:");
        for problem in problems {
            println!("     {problem}");
        }
    }
}
