//! One trial: toss, observe, ask the strategy, repeat until it commits or the budget runs out.
//!
//! States:
//! - `Attempting { attempts }`: `attempts` tosses done so far, none committed.
//! - `Converged`: the strategy committed on attempt number `attempts`.
//! - `Exhausted`: `attempts == max_rerolls` tosses, none committed.

use omd_core::{Face, ObservationBuilder, Roll};
use rand::Rng;
use serde::Serialize;

use crate::strategy::{Decision, Strategy, StrategyError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrialState {
    Attempting { attempts: u32 },
    Converged { attempts: u32, prediction: Face, roll: Roll },
    Exhausted { attempts: u32 },
}

/// Terminal result of a trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrialOutcome {
    Converged {
        attempts: u32,
        prediction: Face,
        /// Raw orientation of every face on the committing attempt.
        roll: Roll,
    },
    Exhausted { attempts: u32 },
}

impl TrialOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            TrialOutcome::Converged { attempts, .. } | TrialOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }

    pub fn prediction(&self) -> Option<Face> {
        match self {
            TrialOutcome::Converged { prediction, .. } => Some(*prediction),
            TrialOutcome::Exhausted { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The strategy asked for a reroll and budget remains.
    Progress,
    Terminal,
}

pub struct Trial {
    state: TrialState,
    max_rerolls: u32,
}

impl Trial {
    /// A zero budget yields a trial that is exhausted before its first toss.
    pub fn new(max_rerolls: u32) -> Self {
        let state = if max_rerolls == 0 {
            TrialState::Exhausted { attempts: 0 }
        } else {
            TrialState::Attempting { attempts: 0 }
        };
        Self { state, max_rerolls }
    }

    pub fn state(&self) -> &TrialState {
        &self.state
    }

    pub fn attempts(&self) -> u32 {
        match self.state {
            TrialState::Attempting { attempts }
            | TrialState::Converged { attempts, .. }
            | TrialState::Exhausted { attempts } => attempts,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, TrialState::Attempting { .. })
    }

    /// Perform one attempt. Does nothing once the trial is terminal.
    pub fn step<S, R>(
        &mut self,
        builder: &ObservationBuilder,
        strategy: &mut S,
        rng: &mut R,
    ) -> Result<StepStatus, StrategyError>
    where
        S: Strategy + ?Sized,
        R: Rng + ?Sized,
    {
        let TrialState::Attempting { attempts } = self.state else {
            return Ok(StepStatus::Terminal);
        };

        let (roll, obs) = builder.attempt(rng);
        let decision = strategy.decide(&obs)?;
        let attempts = attempts + 1;

        match decision {
            Decision::Commit(prediction) => {
                self.state = TrialState::Converged {
                    attempts,
                    prediction,
                    roll,
                };
                Ok(StepStatus::Terminal)
            }
            Decision::Reroll(_) if attempts >= self.max_rerolls => {
                self.state = TrialState::Exhausted { attempts };
                Ok(StepStatus::Terminal)
            }
            Decision::Reroll(_) => {
                self.state = TrialState::Attempting { attempts };
                Ok(StepStatus::Progress)
            }
        }
    }

    /// Step until terminal.
    pub fn run<S, R>(
        &mut self,
        builder: &ObservationBuilder,
        strategy: &mut S,
        rng: &mut R,
    ) -> Result<TrialOutcome, StrategyError>
    where
        S: Strategy + ?Sized,
        R: Rng + ?Sized,
    {
        loop {
            if let Some(outcome) = self.outcome() {
                return Ok(outcome);
            }
            self.step(builder, strategy, rng)?;
        }
    }

    /// Terminal outcome, or `None` while still attempting.
    pub fn outcome(&self) -> Option<TrialOutcome> {
        match &self.state {
            TrialState::Attempting { .. } => None,
            TrialState::Converged {
                attempts,
                prediction,
                roll,
            } => Some(TrialOutcome::Converged {
                attempts: *attempts,
                prediction: *prediction,
                roll: *roll,
            }),
            TrialState::Exhausted { attempts } => Some(TrialOutcome::Exhausted {
                attempts: *attempts,
            }),
        }
    }
}
