//! Domain enums shared across the workspace.
//!
//! The entities persist these as plain strings; the enums own the
//! string mapping so the spelling lives in exactly one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Direction a single strategy recommends for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
    Hold,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = &'static str;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "hold" => Ok(Self::Hold),
            _ => Err("invalid side; expected buy|sell|hold"),
        }
    }
}

/// Side of an open futures position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationDirection {
    Long,
    Short,
}

impl OperationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }

    /// Order side that opens a position in this direction.
    pub fn entry_side(&self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Buy,
            Self::Short => OrderSide::Sell,
        }
    }

    /// Order side that closes a position in this direction.
    pub fn exit_side(&self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Sell,
            Self::Short => OrderSide::Buy,
        }
    }

    pub fn from_side(side: OrderSide) -> Option<Self> {
        match side {
            OrderSide::Buy => Some(Self::Long),
            OrderSide::Sell => Some(Self::Short),
            OrderSide::Hold => None,
        }
    }
}

impl fmt::Display for OperationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationDirection {
    type Err = &'static str;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            _ => Err("invalid direction; expected long|short"),
        }
    }
}

/// Lifecycle of one exchange position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Pending,
    Open,
    Closed,
    Cancelled,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationStatus {
    type Err = &'static str;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err("invalid status; expected pending|open|closed|cancelled"),
        }
    }
}

/// Per-user automation phase.
///
/// `Confirming` is reserved; no transition currently gates on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotPhase {
    Idle,
    Listening,
    Confirming,
    Operating,
}

impl BotPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Confirming => "confirming",
            Self::Operating => "operating",
        }
    }
}

impl fmt::Display for BotPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BotPhase {
    type Err = &'static str;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "listening" => Ok(Self::Listening),
            "confirming" => Ok(Self::Confirming),
            "operating" => Ok(Self::Operating),
            _ => Err("invalid phase; expected idle|listening|confirming|operating"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_round_trips_through_strings() {
        for side in [OrderSide::Buy, OrderSide::Sell, OrderSide::Hold] {
            assert_eq!(side.as_str().parse::<OrderSide>(), Ok(side));
        }
        assert!("flat".parse::<OrderSide>().is_err());
    }

    #[test]
    fn direction_maps_to_order_sides() {
        assert_eq!(OperationDirection::Long.entry_side(), OrderSide::Buy);
        assert_eq!(OperationDirection::Long.exit_side(), OrderSide::Sell);
        assert_eq!(OperationDirection::Short.entry_side(), OrderSide::Sell);
        assert_eq!(OperationDirection::Short.exit_side(), OrderSide::Buy);
    }

    #[test]
    fn hold_never_becomes_a_direction() {
        assert_eq!(OperationDirection::from_side(OrderSide::Hold), None);
        assert_eq!(
            OperationDirection::from_side(OrderSide::Buy),
            Some(OperationDirection::Long)
        );
        assert_eq!(
            OperationDirection::from_side(OrderSide::Sell),
            Some(OperationDirection::Short)
        );
    }

    #[test]
    fn phase_parses_case_insensitively() {
        assert_eq!("LISTENING".parse::<BotPhase>(), Ok(BotPhase::Listening));
        assert_eq!(" operating ".parse::<BotPhase>(), Ok(BotPhase::Operating));
    }
}
