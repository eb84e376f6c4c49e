//! Transaction domain entity.
//! Framework-agnostic representation of a validated financial transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A validated transaction, ready to be handed to a [`Store`](crate::ports::Store).
///
/// The identifier is supplied by the caller; the service never generates one.
/// `amount` carries no sign or magnitude constraint beyond being finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(id: Uuid, amount: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            amount,
            timestamp,
        }
    }
}
