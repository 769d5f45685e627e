pub mod axis_index;
pub mod grid;
pub mod interpolate;
pub mod library;
pub mod response;
pub mod serialization;
pub mod slope;
pub mod target;

pub use axis_index::{GridAxis, LookupIndex, lookup_index};
pub use grid::LookupGrid;
pub use interpolate::{interpolate_scene, interpolate_spectrum};
pub use library::{RadianceLibrary, generate_library};
pub use response::{ResponseMatrix, build_response_matrix, resample_library, validate_bands};
pub use slope::regress_unit_absorption;
pub use target::{TargetOutcome, generate_target, generate_target_with_ladder, run_target_request};
