//! omd-sim: the trial driver and the `simulate` entry point.
//!
//! A run is strictly sequential: trial `i + 1` starts only after trial `i` has either
//! converged (the strategy committed) or exhausted its reroll budget. Randomness comes
//! from the caller-supplied RNG only, so a seeded RNG makes a run reproducible.

pub mod simulate;
pub mod strategy;
pub mod trial;

pub use simulate::{
    run_trials, simulate, simulate_config, simulate_with_observer, AggregateResult, NoopObserver,
    RunStats, SimError, TrialLog, TrialObserver,
};
pub use strategy::{
    from_fn, AlwaysReroll, BuiltinStrategy, Decision, FixedFace, FnStrategy, SingleUp, Strategy,
    StrategyError,
};
pub use trial::{StepStatus, Trial, TrialOutcome, TrialState};

/// Default attempts per trial.
pub const DEFAULT_MAX_REROLLS: u32 = 100;

/// Default number of trials.
pub const DEFAULT_TRIALS: u32 = 1000;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn defaults_match_config_defaults() {
        let run = omd_core::RunConfig::default();
        assert_eq!(run.max_rerolls, DEFAULT_MAX_REROLLS);
        assert_eq!(run.trials, DEFAULT_TRIALS);
    }
}
