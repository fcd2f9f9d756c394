//! Run N independent trials and aggregate the committed predictions.

use omd_core::{
    entropy_seed, seeded_rng, validate_max_rerolls, Config, ConfigError, ObservationBuilder, Roll,
    SimOptions,
};
use omd_stats::{GoodnessOfFit, Histogram, StatsError, CATEGORIES};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::strategy::{Strategy, StrategyError};
use crate::trial::{Trial, TrialOutcome};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("strategy failed in trial {trial} on attempt {attempt}: {source}")]
    Strategy {
        trial: u32,
        attempt: u32,
        #[source]
        source: StrategyError,
    },
    #[error("none of {trials} trials converged within {max_rerolls} attempts")]
    EmptyConvergence {
        trials: u32,
        max_rerolls: u32,
        /// Counters of the failed run.
        stats: RunStats,
    },
    #[error("aggregation failed: {0}")]
    Stats(StatsError),
}

/// Optional per-trial sink (event logs, progress bars).
pub trait TrialObserver {
    fn on_trial(&mut self, trial: u32, outcome: &TrialOutcome);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl TrialObserver for NoopObserver {
    fn on_trial(&mut self, _trial: u32, _outcome: &TrialOutcome) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub trials: u32,
    pub converged: u32,
    pub exhausted: u32,
    /// Attempts summed over all trials.
    pub attempts: u64,
}

impl RunStats {
    pub fn convergence_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.converged as f64 / self.trials as f64
    }

    pub fn mean_attempts(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.attempts as f64 / self.trials as f64
    }
}

/// Raw per-trial results before aggregation, in trial order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrialLog {
    /// One entry per converged trial.
    pub rolls: Vec<Roll>,
    /// 1-based predicted values, one per converged trial.
    pub predictions: Vec<u8>,
    pub stats: RunStats,
    pub max_rerolls: u32,
}

impl TrialLog {
    fn record(&mut self, outcome: &TrialOutcome) {
        self.stats.trials += 1;
        self.stats.attempts += outcome.attempts() as u64;
        match outcome {
            TrialOutcome::Converged {
                prediction, roll, ..
            } => {
                self.stats.converged += 1;
                self.rolls.push(*roll);
                self.predictions.push(prediction.value());
            }
            TrialOutcome::Exhausted { .. } => self.stats.exhausted += 1,
        }
    }

    /// Histogram, chi-square and CDF over the converged predictions.
    pub fn aggregate(self) -> Result<AggregateResult, SimError> {
        if self.predictions.is_empty() {
            return Err(SimError::EmptyConvergence {
                trials: self.stats.trials,
                max_rerolls: self.max_rerolls,
                stats: self.stats,
            });
        }
        let counts = Histogram::from_values(&self.predictions).map_err(SimError::Stats)?;
        let fit = GoodnessOfFit::from_histogram(&counts).map_err(SimError::Stats)?;
        Ok(AggregateResult {
            rolls: self.rolls,
            predictions: self.predictions,
            counts: counts.counts(),
            histogram: fit.histogram,
            chi2: fit.chi2,
            cdf: fit.cdf,
            stats: self.stats,
            seed: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub rolls: Vec<Roll>,
    pub predictions: Vec<u8>,
    /// Number of predictions per value 1..=6.
    pub counts: [u64; CATEGORIES],
    /// Proportion of predictions per value 1..=6.
    pub histogram: [f64; CATEGORIES],
    pub chi2: f64,
    /// Chi-square CDF (df=5) at `chi2`.
    pub cdf: f64,
    pub stats: RunStats,
    /// Seed of the run, when the RNG was created from one.
    pub seed: Option<u64>,
}

/// Run `n` trials without aggregating. Options are validated before the first trial.
pub fn run_trials<S, R>(
    strategy: &mut S,
    options: &SimOptions,
    max_rerolls: u32,
    n: u32,
    rng: &mut R,
    observer: &mut dyn TrialObserver,
) -> Result<TrialLog, SimError>
where
    S: Strategy + ?Sized,
    R: Rng + ?Sized,
{
    options.validate()?;
    validate_max_rerolls(max_rerolls)?;

    let builder = ObservationBuilder::new(options);
    let mut log = TrialLog {
        max_rerolls,
        ..TrialLog::default()
    };
    for trial in 0..n {
        let mut t = Trial::new(max_rerolls);
        // A failed step leaves the attempt counter untouched.
        let outcome = t
            .run(&builder, strategy, rng)
            .map_err(|source| SimError::Strategy {
                trial,
                attempt: t.attempts() + 1,
                source,
            })?;
        observer.on_trial(trial, &outcome);
        log.record(&outcome);
    }
    Ok(log)
}

/// Run `n` trials of `strategy` and aggregate the predictions.
pub fn simulate<S, R>(
    strategy: &mut S,
    options: &SimOptions,
    max_rerolls: u32,
    n: u32,
    rng: &mut R,
) -> Result<AggregateResult, SimError>
where
    S: Strategy + ?Sized,
    R: Rng + ?Sized,
{
    simulate_with_observer(strategy, options, max_rerolls, n, rng, &mut NoopObserver)
}

pub fn simulate_with_observer<S, R>(
    strategy: &mut S,
    options: &SimOptions,
    max_rerolls: u32,
    n: u32,
    rng: &mut R,
    observer: &mut dyn TrialObserver,
) -> Result<AggregateResult, SimError>
where
    S: Strategy + ?Sized,
    R: Rng + ?Sized,
{
    run_trials(strategy, options, max_rerolls, n, rng, observer)?.aggregate()
}

/// Run from a loaded config. Uses `cfg.run.seed`, or draws and reports a fresh seed.
pub fn simulate_config<S>(
    strategy: &mut S,
    cfg: &Config,
    observer: &mut dyn TrialObserver,
) -> Result<AggregateResult, SimError>
where
    S: Strategy + ?Sized,
{
    cfg.validate()?;
    let seed = cfg.run.seed.unwrap_or_else(entropy_seed);
    let mut rng = seeded_rng(seed);
    let mut result = simulate_with_observer(
        strategy,
        &cfg.options,
        cfg.run.max_rerolls,
        cfg.run.trials,
        &mut rng,
        observer,
    )?;
    result.seed = Some(seed);
    Ok(result)
}
