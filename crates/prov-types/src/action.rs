use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A lifecycle event recordable on a listing's chain.
///
/// The set is closed: the wire names (`CREATED`, `VERIFIED`, …) are the only
/// accepted spellings at the string boundary, and `Created` is only valid as
/// the genesis action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleAction {
    /// Listing created (genesis block).
    Created,
    /// Quality verification completed.
    Verified,
    /// Listed on the marketplace.
    Listed,
    /// Purchased by a buyer.
    Purchased,
    /// Collected by a worker.
    Collected,
    /// Delivered to the buyer.
    Delivered,
    /// Recycled or processed.
    Recycled,
    /// Listing cancelled.
    Cancelled,
    /// Listing details updated.
    Updated,
}

impl LifecycleAction {
    /// All actions, in lifecycle order.
    pub const ALL: [Self; 9] = [
        Self::Created,
        Self::Verified,
        Self::Listed,
        Self::Purchased,
        Self::Collected,
        Self::Delivered,
        Self::Recycled,
        Self::Cancelled,
        Self::Updated,
    ];

    /// The canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Verified => "VERIFIED",
            Self::Listed => "LISTED",
            Self::Purchased => "PURCHASED",
            Self::Collected => "COLLECTED",
            Self::Delivered => "DELIVERED",
            Self::Recycled => "RECYCLED",
            Self::Cancelled => "CANCELLED",
            Self::Updated => "UPDATED",
        }
    }

    /// `true` only for the genesis action.
    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Created)
    }
}

impl FromStr for LifecycleAction {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Self::Created),
            "VERIFIED" => Ok(Self::Verified),
            "LISTED" => Ok(Self::Listed),
            "PURCHASED" => Ok(Self::Purchased),
            "COLLECTED" => Ok(Self::Collected),
            "DELIVERED" => Ok(Self::Delivered),
            "RECYCLED" => Ok(Self::Recycled),
            "CANCELLED" => Ok(Self::Cancelled),
            "UPDATED" => Ok(Self::Updated),
            other => Err(TypeError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
