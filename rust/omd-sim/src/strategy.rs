//! Decision strategy interface and the reference strategies.
//!
//! A strategy looks at one attempt's observations and either commits to a face or asks
//! for the whole die to be tossed again.

use std::str::FromStr;

use omd_core::{Face, Observations};

/// Error raised by a strategy. Aborts the whole run.
pub type StrategyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What a strategy wants after seeing one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Predict `face` as the outcome of this trial.
    Commit(Face),
    /// Toss again. The candidate subset is informational; every face is rerolled.
    Reroll(Vec<Face>),
}

pub trait Strategy {
    /// Called once per attempt. `obs` is only valid for the duration of the call.
    fn decide(&mut self, obs: &Observations) -> Result<Decision, StrategyError>;
}

/// Adapter returned by [`from_fn`].
pub struct FnStrategy<F>(F);

impl<F> Strategy for FnStrategy<F>
where
    F: FnMut(&Observations) -> Result<Decision, StrategyError>,
{
    fn decide(&mut self, obs: &Observations) -> Result<Decision, StrategyError> {
        (self.0)(obs)
    }
}

/// Wrap a closure as a strategy.
pub fn from_fn<F>(f: F) -> FnStrategy<F>
where
    F: FnMut(&Observations) -> Result<Decision, StrategyError>,
{
    FnStrategy(f)
}

/// Default model: commit to the only face not pointing down, else reroll.
///
/// Faces are identified by their value label, which stays readable for non-down faces
/// even when observations are unordered.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleUp;

impl Strategy for SingleUp {
    fn decide(&mut self, obs: &Observations) -> Result<Decision, StrategyError> {
        let candidates: Vec<Face> = obs
            .iter()
            .filter(|o| !o.is_down())
            .filter_map(|o| o.face())
            .collect();
        match candidates.as_slice() {
            [only] => Ok(Decision::Commit(*only)),
            _ => Ok(Decision::Reroll(candidates)),
        }
    }
}

/// Always predicts the same face.
#[derive(Debug, Clone, Copy)]
pub struct FixedFace(pub Face);

impl Strategy for FixedFace {
    fn decide(&mut self, _obs: &Observations) -> Result<Decision, StrategyError> {
        Ok(Decision::Commit(self.0))
    }
}

/// Never commits.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReroll;

impl Strategy for AlwaysReroll {
    fn decide(&mut self, _obs: &Observations) -> Result<Decision, StrategyError> {
        Ok(Decision::Reroll(Face::ALL.to_vec()))
    }
}

/// Reference strategies selectable by name (`single-up`, `always-reroll`, `fixed:<value>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuiltinStrategy {
    #[default]
    SingleUp,
    AlwaysReroll,
    /// Fixed face, by its 1-based value label.
    Fixed(Face),
}

impl Strategy for BuiltinStrategy {
    fn decide(&mut self, obs: &Observations) -> Result<Decision, StrategyError> {
        match self {
            BuiltinStrategy::SingleUp => SingleUp.decide(obs),
            BuiltinStrategy::AlwaysReroll => AlwaysReroll.decide(obs),
            BuiltinStrategy::Fixed(face) => FixedFace(*face).decide(obs),
        }
    }
}

impl FromStr for BuiltinStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-up" => Ok(BuiltinStrategy::SingleUp),
            "always-reroll" => Ok(BuiltinStrategy::AlwaysReroll),
            other => {
                let v = other
                    .strip_prefix("fixed:")
                    .ok_or_else(|| format!("unknown strategy: {other}"))?;
                let value: u8 = v
                    .parse()
                    .map_err(|_| format!("invalid face value in {other:?}"))?;
                Face::from_value(value)
                    .map(BuiltinStrategy::Fixed)
                    .ok_or_else(|| format!("face value must be in 1..=6, got {value}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omd_core::{ObservationBuilder, RawOrientation, SimOptions, ValueScheme};

    fn builder(hidden_visible: bool, values: ValueScheme) -> ObservationBuilder {
        ObservationBuilder::new(&SimOptions {
            position: false,
            values,
            hidden_visible,
            ..SimOptions::default()
        })
    }

    fn roll_with_up(faces_up: &[usize]) -> [RawOrientation; 6] {
        let mut roll = [RawOrientation::North; 6];
        for &i in faces_up {
            roll[i] = RawOrientation::Up;
        }
        roll
    }

    #[test]
    fn single_up_commits_on_exactly_one_up() {
        let b = builder(false, ValueScheme::UpOther);
        let obs = b.assemble(&roll_with_up(&[3]), &[None; 6]);
        assert_eq!(
            SingleUp.decide(&obs).unwrap(),
            Decision::Commit(Face::new(3).unwrap())
        );
    }

    #[test]
    fn single_up_rerolls_on_ambiguity() {
        let b = builder(false, ValueScheme::UpOther);
        let two = b.assemble(&roll_with_up(&[1, 4]), &[None; 6]);
        assert_eq!(
            SingleUp.decide(&two).unwrap(),
            Decision::Reroll(vec![Face::new(1).unwrap(), Face::new(4).unwrap()])
        );
        let none = b.assemble(&roll_with_up(&[]), &[None; 6]);
        assert_eq!(SingleUp.decide(&none).unwrap(), Decision::Reroll(vec![]));
    }

    #[test]
    fn single_up_works_on_unordered_observations() {
        let b = builder(true, ValueScheme::UpOther);
        let obs = b.assemble(&roll_with_up(&[5]), &[None; 6]);
        assert!(!obs.is_ordered());
        assert_eq!(
            SingleUp.decide(&obs).unwrap(),
            Decision::Commit(Face::new(5).unwrap())
        );
    }

    #[test]
    fn single_up_counts_sideways_faces_as_not_down() {
        let b = builder(false, ValueScheme::UpSideDown);
        // One up face plus five sideways faces: ambiguous.
        let obs = b.assemble(&roll_with_up(&[0]), &[None; 6]);
        assert!(matches!(SingleUp.decide(&obs).unwrap(), Decision::Reroll(c) if c.len() == 6));
    }

    #[test]
    fn builtin_names_parse() {
        assert_eq!("single-up".parse(), Ok(BuiltinStrategy::SingleUp));
        assert_eq!("always-reroll".parse(), Ok(BuiltinStrategy::AlwaysReroll));
        assert_eq!(
            "fixed:1".parse(),
            Ok(BuiltinStrategy::Fixed(Face::new(0).unwrap()))
        );
        assert!("fixed:0".parse::<BuiltinStrategy>().is_err());
        assert!("fixed:x".parse::<BuiltinStrategy>().is_err());
        assert!("oracle".parse::<BuiltinStrategy>().is_err());
    }

    #[test]
    fn closures_adapt_into_strategies() {
        let mut calls = 0u32;
        let mut s = from_fn(|_obs: &Observations| {
            calls += 1;
            Ok(Decision::Reroll(Vec::new()))
        });
        let obs = builder(false, ValueScheme::UpOther).assemble(&roll_with_up(&[0]), &[None; 6]);
        s.decide(&obs).unwrap();
        s.decide(&obs).unwrap();
        drop(s);
        assert_eq!(calls, 2);
    }
}
