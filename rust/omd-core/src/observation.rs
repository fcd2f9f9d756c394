//! Per-attempt observations handed to a decision strategy.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{PositionGrid, SimOptions};
use crate::encoding::{EncodedDirection, ValueScheme};
use crate::face::{sample_roll, Face, Roll, NUM_FACES};

/// Integer position of a face on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

/// What the strategy can see of one face in one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// `None` when position reporting is disabled.
    pub position: Option<Position>,
    /// Marked value 1..=6, or 0 when it cannot be read.
    pub value: u8,
    pub direction: EncodedDirection,
}

impl Observation {
    pub fn is_down(&self) -> bool {
        self.direction == EncodedDirection::Down
    }

    /// The face this observation belongs to, if its value is readable.
    pub fn face(&self) -> Option<Face> {
        Face::from_value(self.value)
    }
}

/// Whether an observation collection preserves face order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Element `i` belongs to face `i`.
    Ordered,
    /// Elements are kept in a canonical sorted order; no face index can be recovered.
    Unordered,
}

/// Exactly six observations, one per face.
///
/// Unordered collections are multisets: two collections holding the same records in a
/// different order compare equal, and duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Observations {
    items: [Observation; NUM_FACES],
    layout: Layout,
}

impl Observations {
    pub fn ordered(items: [Observation; NUM_FACES]) -> Self {
        Self {
            items,
            layout: Layout::Ordered,
        }
    }

    pub fn unordered(mut items: [Observation; NUM_FACES]) -> Self {
        items.sort_unstable();
        Self {
            items,
            layout: Layout::Unordered,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn is_ordered(&self) -> bool {
        self.layout == Layout::Ordered
    }

    /// Observation of `face`. Always `None` for unordered collections.
    pub fn get(&self, face: Face) -> Option<&Observation> {
        match self.layout {
            Layout::Ordered => Some(&self.items[face.index()]),
            Layout::Unordered => None,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn count_direction(&self, direction: EncodedDirection) -> usize {
        self.items.iter().filter(|o| o.direction == direction).count()
    }
}

impl<'a> IntoIterator for &'a Observations {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Builds the observation collection for each attempt from the run options.
#[derive(Debug, Clone)]
pub struct ObservationBuilder {
    scheme: ValueScheme,
    grid: Option<PositionGrid>,
    hidden_visible: bool,
}

impl ObservationBuilder {
    pub fn new(opts: &SimOptions) -> Self {
        Self {
            scheme: opts.values,
            grid: opts.position.then_some(opts.grid),
            hidden_visible: opts.hidden_visible,
        }
    }

    pub fn scheme(&self) -> ValueScheme {
        self.scheme
    }

    pub fn layout(&self) -> Layout {
        if self.hidden_visible {
            Layout::Unordered
        } else {
            Layout::Ordered
        }
    }

    /// Toss all six faces.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Roll {
        sample_roll(rng, self.scheme.uses_azimuth())
    }

    /// Draw a table position per face (`x` then `y`, face order), or nothing if disabled.
    pub fn positions<R: Rng + ?Sized>(&self, rng: &mut R) -> [Option<Position>; NUM_FACES] {
        let mut out = [None; NUM_FACES];
        if let Some(grid) = self.grid {
            for p in &mut out {
                *p = Some(Position {
                    x: rng.gen_range(0..=grid.width),
                    y: rng.gen_range(0..=grid.height),
                });
            }
        }
        out
    }

    /// Encode a roll into the collection the strategy sees. Pure; no randomness.
    pub fn assemble(&self, roll: &Roll, positions: &[Option<Position>; NUM_FACES]) -> Observations {
        let mut items = [Observation {
            position: None,
            value: 0,
            direction: EncodedDirection::Down,
        }; NUM_FACES];
        for face in Face::ALL {
            let i = face.index();
            let direction = self.scheme.encode(roll[i]);
            let value = if self.hidden_visible && direction == EncodedDirection::Down {
                0
            } else {
                face.value()
            };
            items[i] = Observation {
                position: positions[i],
                value,
                direction,
            };
        }
        match self.layout() {
            Layout::Ordered => Observations::ordered(items),
            Layout::Unordered => Observations::unordered(items),
        }
    }

    /// One full attempt: toss, place, encode.
    pub fn attempt<R: Rng + ?Sized>(&self, rng: &mut R) -> (Roll, Observations) {
        let roll = self.roll(rng);
        let positions = self.positions(rng);
        let obs = self.assemble(&roll, &positions);
        (roll, obs)
    }
}
