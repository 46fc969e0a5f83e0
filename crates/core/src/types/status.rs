//! Order status and its display mapping.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Stored and serialized with the capitalized names (`"Processing"`), which
/// is what the `orders.status` column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created but awaiting confirmation (e.g. payment).
    Pending,
    /// Accepted and being prepared.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled by the shop or the customer.
    Cancelled,
}

/// Badge colour shown next to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeColor {
    Gray,
    Blue,
    Yellow,
    Green,
    Red,
}

impl BadgeColor {
    /// CSS utility class for the badge background.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Gray => "bg-gray-500",
            Self::Blue => "bg-blue-500",
            Self::Yellow => "bg-yellow-500",
            Self::Green => "bg-green-500",
            Self::Red => "bg-red-500",
        }
    }
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Badge colour for this status.
    #[must_use]
    pub const fn badge(self) -> BadgeColor {
        match self {
            Self::Pending => BadgeColor::Gray,
            Self::Processing => BadgeColor::Blue,
            Self::Shipped => BadgeColor::Yellow,
            Self::Delivered => BadgeColor::Green,
            Self::Cancelled => BadgeColor::Red,
        }
    }

    /// No further transitions are allowed out of a terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an order in this status may be moved to `next`.
    ///
    /// Re-applying the current status is always allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an [`OrderStatus`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order status: {0}")]
pub struct StatusParseError(pub String);

impl FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}
