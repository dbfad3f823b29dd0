//! Headless Planeview demo: combine two synthetic datasets and save the display.

mod config;
mod synthetic;

use std::sync::Arc;

use parking_lot::RwLock;
use planeview_core::{
    CalculatorSettings, Cancelable, ColorTable, DatasetView, DefaultDatasetService,
    DisplaySettings, ImageCalculator, PlaneviewError,
};
use tracing_subscriber::EnvFilter;

use config::DemoConfig;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Core(#[from] PlaneviewError),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("calculator canceled: {0}")]
    Canceled(String),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    if let Err(e) = run(DemoConfig::default()) {
        tracing::error!("demo failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: DemoConfig) -> Result<(), DemoError> {
    let settings = match &config.settings_path {
        Some(path) => CalculatorSettings::from_json(&std::fs::read_to_string(path)?)?,
        None => CalculatorSettings::new(planeview_core::BinaryOp::TransparentZero),
    };
    tracing::info!(
        "running {} on {}x{} synthetic images (new_window={}, want_doubles={})",
        settings.operation,
        config.size,
        config.size,
        settings.new_window,
        settings.want_doubles
    );

    let mut input1 = synthetic::gradients(config.size)?;
    let input2 = synthetic::disc(config.size)?;
    let mut calculator = ImageCalculator::new(settings);
    let output = calculator.run(&mut input1, &input2, &DefaultDatasetService)?;
    if let Some(reason) = calculator.cancel_reason() {
        return Err(DemoError::Canceled(reason.to_string()));
    }

    // In-place runs leave the result in input1.
    let result = output.unwrap_or(input1);
    tracing::info!("result {:?}: {} {:?}", result.name(), result.kind(), result.dims());

    let mut display = DisplaySettings::new(config.mode);
    if result.kind().is_float() {
        let values = result.image().to_f64_vec();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        display.range = planeview_core::DisplayRange::new(min, max);
    }
    let channels = result.channel_count();
    let view = DatasetView::new(
        "Result",
        Arc::new(RwLock::new(result)),
        &display,
        ColorTable::defaults_for_channels(channels),
    )?;

    view.raster().to_rgba_image().save(&config.output)?;
    tracing::info!("wrote {:?} view to {}", view.mode(), config.output.display());
    Ok(())
}
