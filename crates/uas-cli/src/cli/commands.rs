use super::CliError;
use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;
use uas_core::domain::{
    DEFAULT_DATASET_PATH, DEFAULT_OUTPUT_PATH, SceneParameters, SplineOrder, TargetRequest,
};
use uas_core::modules::target::run_target_request;

#[derive(clap::Args)]
pub(super) struct GenerateArgs {
    /// Zenith angle (in degrees) for generated spectrum
    #[arg(short = 'z', long, alias = "zenith_angle", allow_negative_numbers = true)]
    zenith_angle: f64,

    /// Sensor height (in km) above ground
    #[arg(short = 's', long, alias = "sensor_height", allow_negative_numbers = true)]
    sensor_height: f64,

    /// Ground elevation (in km)
    #[arg(short = 'g', long, alias = "ground_elevation", allow_negative_numbers = true)]
    ground_elevation: f64,

    /// Column water vapor (in cm)
    #[arg(short = 'w', long, alias = "water_vapor", allow_negative_numbers = true)]
    water_vapor: f64,

    /// Spline interpolation degree (1 or 3)
    #[arg(long, default_value = "1", value_parser = parse_spline_order)]
    order: SplineOrder,

    /// ENVI header of the flightline supplying band centers and fwhm
    #[arg(long)]
    hdr: PathBuf,

    /// Output file for the spectrum table
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Lookup grid archive (.npz)
    #[arg(long, default_value = DEFAULT_DATASET_PATH)]
    dataset: PathBuf,

    /// Optional JSON run summary path
    #[arg(long)]
    metadata: Option<PathBuf>,
}

impl GenerateArgs {
    fn into_request(self) -> TargetRequest {
        let scene = SceneParameters::new(
            self.zenith_angle,
            self.sensor_height,
            self.ground_elevation,
            self.water_vapor,
            self.order,
        );
        TargetRequest {
            dataset_path: self.dataset,
            output_path: self.output,
            metadata_path: self.metadata,
            ..TargetRequest::new(scene, self.hdr)
        }
    }
}

fn parse_spline_order(raw: &str) -> Result<SplineOrder, String> {
    let degree = raw
        .trim()
        .parse::<u8>()
        .map_err(|_| format!("spline order must be 1 or 3, got '{raw}'"))?;
    SplineOrder::try_from(degree).map_err(|error| error.message().to_string())
}

pub(super) fn run_generate_command(args: GenerateArgs) -> Result<i32, CliError> {
    let request = args.into_request();
    tracing::debug!(
        header = %request.header_path.display(),
        dataset = %request.dataset_path.display(),
        order = %request.scene.order,
        "starting unit absorption spectrum generation"
    );

    let outcome = run_target_request(&request).map_err(CliError::Compute)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "Wrote {} band(s) to {}",
        outcome.spectrum.len(),
        request.output_path.display()
    )
    .context("failed to write run summary")?;
    if !outcome.degenerate_bands.is_empty() {
        writeln!(
            stdout,
            "{} band(s) have no response over the grid wavelengths and were left unnormalized",
            outcome.degenerate_bands.len()
        )
        .context("failed to write run summary")?;
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::parse_spline_order;
    use uas_core::domain::SplineOrder;

    #[test]
    fn spline_order_accepts_only_linear_and_cubic() {
        assert_eq!(parse_spline_order("1"), Ok(SplineOrder::Linear));
        assert_eq!(parse_spline_order("3"), Ok(SplineOrder::Cubic));
        assert!(parse_spline_order("2").is_err());
        assert!(parse_spline_order("cubic").is_err());
    }
}
