//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads environment defaults and parses CLI arguments
//! - starts logging
//! - dispatches to the fit pipelines
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, DemoArgs, PolyArgs, SolveArgs};
use crate::config::Settings;
use crate::domain::{DemoConfig, PolyConfig, SolveConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `doasfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    let _logger = crate::logging::init(level)?;

    match cli.command {
        Command::Solve(args) => handle_solve(solve_config_from_args(&args, &settings)),
        Command::Poly(args) => handle_poly(poly_config_from_args(&args)),
        Command::Demo(args) => handle_demo(demo_config_from_args(&args, &settings)),
    }
}

fn handle_solve(config: SolveConfig) -> Result<(), AppError> {
    let run = pipeline::run_solve(&config)?;
    println!("{}", crate::report::format_fit_report(&run.report));

    if let Some(path) = &config.export {
        crate::io::write_json(path, &run.report)?;
        log::info!("wrote report to {}", path.display());
    }
    Ok(())
}

fn handle_poly(config: PolyConfig) -> Result<(), AppError> {
    let fit = pipeline::run_poly(&config)?;
    println!("{}", crate::report::format_polynomial(&fit));

    if let Some(path) = &config.export {
        crate::io::write_json(path, &fit)?;
        log::info!("wrote coefficients to {}", path.display());
    }
    Ok(())
}

fn handle_demo(config: DemoConfig) -> Result<(), AppError> {
    let run = pipeline::run_demo(&config)?;
    println!("{}", crate::report::format_fit_report(&run.fit.report));
    println!(
        "{}",
        crate::report::format_demo_comparison(&run.fit.report, &run.spectrum.truth)
    );

    if let Some(path) = &config.export {
        crate::io::write_spectrum_csv(path, &run.rows)?;
        log::info!("wrote spectrum to {}", path.display());
    }
    Ok(())
}

pub fn solve_config_from_args(args: &SolveArgs, settings: &Settings) -> SolveConfig {
    SolveConfig {
        input: args.input.clone(),
        mode: args.mode.unwrap_or(settings.default_mode),
        covariance: args.covariance,
        pseudo_inverse: args.pinv,
        export: args.export.clone(),
    }
}

pub fn poly_config_from_args(args: &PolyArgs) -> PolyConfig {
    PolyConfig {
        input: args.input.clone(),
        order: args.order,
        export: args.export.clone(),
    }
}

pub fn demo_config_from_args(args: &DemoArgs, settings: &Settings) -> DemoConfig {
    DemoConfig {
        samples: args.samples,
        seed: args.seed,
        noise: args.noise,
        mode: args.mode.unwrap_or(settings.default_mode),
        baseline_order: args.baseline_order,
        wavelength_min: args.wl_min,
        wavelength_max: args.wl_max,
        export: args.export.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::DecompositionMode;

    #[test]
    fn cli_mode_overrides_environment_default() {
        let settings = Settings {
            default_mode: DecompositionMode::Qr,
            ..Settings::default()
        };
        let cli = Cli::parse_from(["doasfit", "demo", "--mode", "svd"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(demo_config_from_args(&args, &settings).mode, DecompositionMode::Svd);

        let cli = Cli::parse_from(["doasfit", "solve", "--input", "p.json"]);
        let Command::Solve(args) = cli.command else {
            panic!("expected solve");
        };
        assert_eq!(solve_config_from_args(&args, &settings).mode, DecompositionMode::Qr);
    }
}
