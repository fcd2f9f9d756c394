//! Faces of the marked die and their raw post-toss orientation.
//!
//! Each of the six faces carries one marked value (`index + 1`). Which value is
//! "up" is determined by the orientation of the faces, not by printed pips.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of faces on the die.
pub const NUM_FACES: usize = 6;

/// Azimuths are drawn from `0..AZIMUTH_STEPS` (whole degrees).
pub const AZIMUTH_STEPS: u16 = 360;

/// One of the six faces, by 0-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Face(u8);

impl Face {
    pub const ALL: [Face; NUM_FACES] = [Face(0), Face(1), Face(2), Face(3), Face(4), Face(5)];

    /// Returns `None` for indices outside `0..6`.
    pub const fn new(index: u8) -> Option<Face> {
        if (index as usize) < NUM_FACES {
            Some(Face(index))
        } else {
            None
        }
    }

    /// Face carrying the 1-based marked value `value`.
    pub const fn from_value(value: u8) -> Option<Face> {
        if value == 0 {
            return None;
        }
        Face::new(value - 1)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Marked value label, `index + 1`.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0 + 1
    }
}

impl TryFrom<u8> for Face {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Face::new(index).ok_or_else(|| format!("face index out of range: {index}"))
    }
}

impl From<Face> for u8 {
    fn from(f: Face) -> u8 {
        f.0
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face{}", self.value())
    }
}

/// Physical state of one face after a toss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawOrientation {
    Up,
    Down,
    North,
    South,
    East,
    West,
    /// Horizontal rotation in whole degrees, `0..360`.
    Azimuth(u16),
}

/// The six symmetric axis directions, in draw order.
pub const AXES: [RawOrientation; 6] = [
    RawOrientation::Up,
    RawOrientation::Down,
    RawOrientation::North,
    RawOrientation::East,
    RawOrientation::South,
    RawOrientation::West,
];

impl RawOrientation {
    /// True for north/south/east/west and for continuous azimuths.
    pub fn is_horizontal(self) -> bool {
        !matches!(self, RawOrientation::Up | RawOrientation::Down)
    }
}

impl fmt::Display for RawOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawOrientation::Up => f.write_str("up"),
            RawOrientation::Down => f.write_str("down"),
            RawOrientation::North => f.write_str("north"),
            RawOrientation::South => f.write_str("south"),
            RawOrientation::East => f.write_str("east"),
            RawOrientation::West => f.write_str("west"),
            RawOrientation::Azimuth(deg) => write!(f, "{deg}"),
        }
    }
}

/// Raw orientation of every face for one attempt, indexed by face.
pub type Roll = [RawOrientation; NUM_FACES];

/// Draw one raw orientation, uniformly over the six axes.
///
/// With `continuous_azimuth`, a horizontal draw is replaced by a uniform azimuth in
/// `0..360`; `up` and `down` stay discrete.
pub fn sample_orientation<R: Rng + ?Sized>(rng: &mut R, continuous_azimuth: bool) -> RawOrientation {
    let axis = AXES[rng.gen_range(0..AXES.len())];
    if continuous_azimuth && axis.is_horizontal() {
        RawOrientation::Azimuth(rng.gen_range(0..AZIMUTH_STEPS))
    } else {
        axis
    }
}

/// Draw the orientation of all six faces (six independent draws, face order).
pub fn sample_roll<R: Rng + ?Sized>(rng: &mut R, continuous_azimuth: bool) -> Roll {
    let mut out = [RawOrientation::Up; NUM_FACES];
    for o in &mut out {
        *o = sample_orientation(rng, continuous_azimuth);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chance::seeded_rng;

    #[test]
    fn face_bounds() {
        assert!(Face::new(5).is_some());
        assert!(Face::new(6).is_none());
        assert_eq!(Face::from_value(1), Face::new(0));
        assert!(Face::from_value(0).is_none());
        assert!(Face::from_value(7).is_none());
        for f in Face::ALL {
            assert_eq!(f.value() as usize, f.index() + 1);
        }
    }

    #[test]
    fn discrete_sampling_covers_all_axes() {
        let mut rng = seeded_rng(1);
        let mut seen = [0u32; 6];
        for _ in 0..6_000 {
            let o = sample_orientation(&mut rng, false);
            let i = AXES.iter().position(|&a| a == o).expect("discrete axis");
            seen[i] += 1;
        }
        // Loose uniformity check: each axis within ±20% of 1000.
        for (i, &c) in seen.iter().enumerate() {
            assert!((800..=1200).contains(&c), "axis {i} drawn {c} times");
        }
    }

    #[test]
    fn continuous_sampling_keeps_up_down_discrete() {
        let mut rng = seeded_rng(2);
        let mut azimuths = 0;
        for _ in 0..2_000 {
            match sample_orientation(&mut rng, true) {
                RawOrientation::Up | RawOrientation::Down => {}
                RawOrientation::Azimuth(deg) => {
                    assert!(deg < AZIMUTH_STEPS);
                    azimuths += 1;
                }
                other => panic!("horizontal axis leaked through: {other:?}"),
            }
        }
        assert!(azimuths > 0);
    }

    #[test]
    fn face_serde_rejects_out_of_range() {
        let f: Face = serde_yaml::from_str("3").unwrap();
        assert_eq!(f.value(), 4);
        assert!(serde_yaml::from_str::<Face>("6").is_err());
    }
}
