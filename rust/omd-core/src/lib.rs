//! omd-core: faces, orientation sampling, observability schemes, observations, and configuration.

pub mod chance;
pub mod config;
pub mod encoding;
pub mod face;
pub mod observation;

pub use chance::{entropy_seed, seeded_rng, SimRng};
pub use config::{validate_max_rerolls, Config, ConfigError, PositionGrid, RunConfig, SimOptions};
pub use encoding::{EncodedDirection, ValueScheme};
pub use face::{sample_orientation, sample_roll, Face, RawOrientation, Roll, AXES, NUM_FACES};
pub use observation::{Layout, Observation, ObservationBuilder, Observations, Position};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
