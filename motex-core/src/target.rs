use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reach targets around the arena edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Top,
    Bottom,
    Left,
    Right,
}

impl Target {
    pub const ALL: [Target; 4] = [Target::Top, Target::Bottom, Target::Left, Target::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Top => "top",
            Target::Bottom => "bottom",
            Target::Left => "left",
            Target::Right => "right",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Target::Top),
            "bottom" => Ok(Target::Bottom),
            "left" => Ok(Target::Left),
            "right" => Ok(Target::Right),
            other => Err(CoreError::UnknownTarget(other.to_string())),
        }
    }
}
