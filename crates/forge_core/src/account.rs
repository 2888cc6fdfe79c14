//! Account identity and credit amounts.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Credit amounts are whole, signed units; balances are never negative.
pub type Credits = i64;

/// Opaque identity of a billable account, as issued by the identity provider.
///
/// # Examples
///
/// ```
/// use forge_core::AccountId;
///
/// let id: AccountId = "6f1c7c2e-2d8f-4a44-9d0e-5b0c1f3f4a11".parse().unwrap();
/// assert_eq!(id.to_string(), "6f1c7c2e-2d8f-4a44-9d0e-5b0c1f3f4a11");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Wraps a raw uuid.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying uuid.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}
