//! Sibling ordering by orientation.

use cmdb_core::Value;
use serde::{Serialize, Serializer};
use std::fmt;

/// Direction in which siblings are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
    /// Any other value. Siblings fall back to alphabetical order.
    Unspecified,
}

/// How an orientation orders siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortRule {
    /// Ascending by numeric position, missing positions counting as 0.
    PositionAscending,
    /// Descending by numeric position.
    PositionDescending,
    /// Ascending by display name.
    Alphabetical,
}

impl Orientation {
    /// Parse an orientation name. Unrecognized names are `Unspecified`.
    pub fn parse(s: &str) -> Self {
        match s {
            "LeftToRight" => Orientation::LeftToRight,
            "RightToLeft" => Orientation::RightToLeft,
            "TopToBottom" => Orientation::TopToBottom,
            "BottomToTop" => Orientation::BottomToTop,
            _ => Orientation::Unspecified,
        }
    }

    /// Read an orientation property. Absent or null means the default,
    /// any non-string value is `Unspecified`.
    pub fn from_property(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Orientation::default(),
            Some(Value::String(s)) => Orientation::parse(s),
            Some(_) => Orientation::Unspecified,
        }
    }

    pub fn sort_rule(&self) -> SortRule {
        match self {
            Orientation::LeftToRight | Orientation::TopToBottom => SortRule::PositionAscending,
            Orientation::RightToLeft | Orientation::BottomToTop => SortRule::PositionDescending,
            Orientation::Unspecified => SortRule::Alphabetical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::LeftToRight => "LeftToRight",
            Orientation::RightToLeft => "RightToLeft",
            Orientation::TopToBottom => "TopToBottom",
            Orientation::BottomToTop => "BottomToTop",
            Orientation::Unspecified => "Unspecified",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Orientation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
