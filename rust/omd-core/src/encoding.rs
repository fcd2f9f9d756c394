//! Observability schemes: what a strategy can tell about each face's direction.
//!
//! | scheme         | up | down | north/south/east/west | azimuth |
//! |----------------|----|------|-----------------------|---------|
//! | `up-other`     | up | down | down                  | down    |
//! | `up-side-down` | up | down | side                  | side    |
//! | `up-4-down`    | up | down | side                  | side    |
//! | `up-360-down`  | up | down | side                  | azimuth |
//!
//! `up-side-down` and `up-4-down` currently collapse identically. Under `up-360-down`
//! the sampler only ever produces azimuths for horizontal faces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::face::RawOrientation;

/// Direction of a face as seen by the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodedDirection {
    Up,
    Down,
    Side,
    Azimuth(u16),
}

impl fmt::Display for EncodedDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedDirection::Up => f.write_str("up"),
            EncodedDirection::Down => f.write_str("down"),
            EncodedDirection::Side => f.write_str("side"),
            EncodedDirection::Azimuth(deg) => write!(f, "{deg}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueScheme {
    #[default]
    #[serde(rename = "up-other")]
    UpOther,
    #[serde(rename = "up-side-down")]
    UpSideDown,
    #[serde(rename = "up-4-down")]
    Up4Down,
    #[serde(rename = "up-360-down")]
    Up360Down,
}

impl ValueScheme {
    pub const ALL: [ValueScheme; 4] = [
        ValueScheme::UpOther,
        ValueScheme::UpSideDown,
        ValueScheme::Up4Down,
        ValueScheme::Up360Down,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ValueScheme::UpOther => "up-other",
            ValueScheme::UpSideDown => "up-side-down",
            ValueScheme::Up4Down => "up-4-down",
            ValueScheme::Up360Down => "up-360-down",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ValueScheme::UpOther => "only the face pointing straight up is distinguishable",
            ValueScheme::UpSideDown => "up, down, and sideways faces are distinguishable",
            ValueScheme::Up4Down => "up, down, and sideways faces are distinguishable",
            ValueScheme::Up360Down => "up and down faces plus the azimuth of sideways faces",
        }
    }

    /// Whether the sampler should draw continuous azimuths for horizontal faces.
    pub fn uses_azimuth(self) -> bool {
        matches!(self, ValueScheme::Up360Down)
    }

    /// Map a raw orientation into this scheme.
    pub fn encode(self, raw: RawOrientation) -> EncodedDirection {
        match (self, raw) {
            (_, RawOrientation::Up) => EncodedDirection::Up,
            (_, RawOrientation::Down) => EncodedDirection::Down,
            (ValueScheme::UpOther, _) => EncodedDirection::Down,
            (ValueScheme::Up360Down, RawOrientation::Azimuth(deg)) => EncodedDirection::Azimuth(deg),
            (ValueScheme::UpSideDown | ValueScheme::Up4Down | ValueScheme::Up360Down, _) => {
                EncodedDirection::Side
            }
        }
    }
}

impl fmt::Display for ValueScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueScheme::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| ConfigError::UnknownScheme(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::AXES;

    #[test]
    fn up_other_only_up_or_down() {
        for raw in AXES.into_iter().chain([RawOrientation::Azimuth(90)]) {
            let d = ValueScheme::UpOther.encode(raw);
            assert!(matches!(d, EncodedDirection::Up | EncodedDirection::Down), "{raw:?} -> {d:?}");
        }
        assert_eq!(ValueScheme::UpOther.encode(RawOrientation::Up), EncodedDirection::Up);
        assert_eq!(ValueScheme::UpOther.encode(RawOrientation::West), EncodedDirection::Down);
    }

    #[test]
    fn side_schemes_collapse_horizontal() {
        for scheme in [ValueScheme::UpSideDown, ValueScheme::Up4Down] {
            assert_eq!(scheme.encode(RawOrientation::Up), EncodedDirection::Up);
            assert_eq!(scheme.encode(RawOrientation::Down), EncodedDirection::Down);
            for raw in [
                RawOrientation::North,
                RawOrientation::South,
                RawOrientation::East,
                RawOrientation::West,
            ] {
                assert_eq!(scheme.encode(raw), EncodedDirection::Side);
            }
        }
    }

    #[test]
    fn azimuth_scheme_keeps_angle() {
        let s = ValueScheme::Up360Down;
        assert!(s.uses_azimuth());
        assert_eq!(s.encode(RawOrientation::Azimuth(271)), EncodedDirection::Azimuth(271));
        assert_eq!(s.encode(RawOrientation::Down), EncodedDirection::Down);
        assert!(!ValueScheme::UpSideDown.uses_azimuth());
    }

    #[test]
    fn names_roundtrip_and_unknown_rejected() {
        for s in ValueScheme::ALL {
            assert_eq!(s.name().parse::<ValueScheme>().unwrap(), s);
        }
        let err = "up-down".parse::<ValueScheme>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownScheme(ref n) if n == "up-down"));
    }

    #[test]
    fn serde_uses_scheme_names() {
        let s: ValueScheme = serde_yaml::from_str("up-4-down").unwrap();
        assert_eq!(s, ValueScheme::Up4Down);
        assert!(serde_yaml::from_str::<ValueScheme>("sideways").is_err());
    }
}
