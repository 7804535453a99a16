mod axes;
mod buttons;

pub use axes::*;
pub use buttons::*;

use std::fmt;
use std::str::FromStr;

/// Logical buttons shared by every input source.
///
/// The discriminant is the index used when decoding flat button vectors, so
/// the order must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonType {
    Trigger = 0,
    Grip = 1,
    Thumbstick = 2,
    Touchpad = 3,
    ButtonA = 4,
    ButtonB = 5,
}

pub const BUTTON_COUNT: usize = 6;

impl ButtonType {
    pub const ALL: [ButtonType; BUTTON_COUNT] = [
        Self::Trigger,
        Self::Grip,
        Self::Thumbstick,
        Self::Touchpad,
        Self::ButtonA,
        Self::ButtonB,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Trigger => "Trigger",
            Self::Grip => "Grip",
            Self::Thumbstick => "Thumbstick",
            Self::Touchpad => "Touchpad",
            Self::ButtonA => "A",
            Self::ButtonB => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisType {
    Trigger,
    Grip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis2DType {
    /// Primary 2D axis
    Thumbstick,
    /// Secondary 2D axis
    Touchpad,
}

/// Which hand a logical device represents.
///
/// Snapshots carry the hand as a raw integer; `wire_value` is that encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Handedness {
    #[default]
    None,
    Left,
    Right,
}

impl Handedness {
    pub fn wire_value(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Left => 1,
            Self::Right => 2,
        }
    }

    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Left),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized controller hand '{0}'")]
pub struct ParseHandednessError(pub String);

impl FromStr for Handedness {
    type Err = ParseHandednessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            _ => Err(ParseHandednessError(s.to_string())),
        }
    }
}
