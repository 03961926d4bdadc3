//! Approval Status Value Object
//!
//! Doctor-account lifecycle state. Meaningful only for doctor-role
//! accounts; other roles carry no status.
//!
//! ## Design Decisions
//! - **Flat transition graph**: any state may be set to any other by an
//!   admin action. The only systemic assignment is `Pending` at doctor
//!   self-registration.
//! - **Mirror boolean**: `is_approved` on the account must always equal
//!   `status == Approved`; both are written together in one operation.
//! - **Closed literal set**: the wire format is exactly the four uppercase
//!   literals; anything else is a malformed request, not a state-machine
//!   violation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Doctor-account approval status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApprovalStatus {
    /// Initial state on doctor self-registration, awaiting review
    #[default]
    Pending,
    /// Visible and usable
    Approved,
    /// Temporarily withdrawn by an admin
    Suspended,
    /// Permanently withdrawn by an admin (still reversible by admin action)
    Banned,
}

impl ApprovalStatus {
    /// Wire/storage literal
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Suspended => "SUSPENDED",
            Self::Banned => "BANNED",
        }
    }

    /// The derived mirror boolean
    #[inline]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Parse a wire literal. The set is closed and case-sensitive; `None`
    /// means the request is malformed.
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "SUSPENDED" => Some(Self::Suspended),
            "BANNED" => Some(Self::Banned),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
