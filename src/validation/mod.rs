use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::Transaction;

pub const TRANSACTION_ID_FIELD: &str = "transactionId";
pub const AMOUNT_FIELD: &str = "amount";

/// Incoming JSON payload for `POST /api/transaction/`.
///
/// `amount` travels as text and is decimal-parsed server side. Unknown fields
/// are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub transaction_id: String,
    pub amount: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, value: &str, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub fn parse_transaction_id(raw: &str) -> ValidationResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| ValidationError::new(TRANSACTION_ID_FIELD, raw, e.to_string()))
}

/// Parses a base-10 amount. `inf`/`NaN` spellings parse as `f64` but are not
/// monetary amounts, so they are rejected too.
pub fn parse_amount(raw: &str) -> ValidationResult<f64> {
    let amount = raw
        .parse::<f64>()
        .map_err(|e| ValidationError::new(AMOUNT_FIELD, raw, e.to_string()))?;

    if !amount.is_finite() {
        return Err(ValidationError::new(AMOUNT_FIELD, raw, "must be a finite number"));
    }

    Ok(amount)
}

impl TransactionRequest {
    /// Identifier first, then amount. The first failure wins.
    pub fn validate(&self) -> ValidationResult<Transaction> {
        let id = parse_transaction_id(&self.transaction_id)?;
        let amount = parse_amount(&self.amount)?;

        Ok(Transaction::new(id, amount, self.timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str, amount: &str) -> TransactionRequest {
        TransactionRequest {
            transaction_id: id.to_string(),
            amount: amount.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn parses_canonical_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_transaction_id(&id.to_string()).unwrap(), id);
        assert_eq!(
            parse_transaction_id(&id.to_string().to_uppercase()).unwrap(),
            id
        );
    }

    #[test]
    fn rejects_malformed_uuid() {
        let err = parse_transaction_id("not-a-uuid").unwrap_err();
        assert_eq!(err.field, TRANSACTION_ID_FIELD);
        assert_eq!(err.value, "not-a-uuid");
        assert!(parse_transaction_id("").is_err());
    }

    #[test]
    fn parses_decimal_amounts() {
        assert_eq!(parse_amount("100.50").unwrap(), 100.5);
        assert_eq!(parse_amount("-42").unwrap(), -42.0);
        assert_eq!(parse_amount("0").unwrap(), 0.0);
        assert_eq!(parse_amount("1e3").unwrap(), 1000.0);
    }

    #[test]
    fn rejects_unparseable_amounts() {
        assert!(parse_amount("not-a-number").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("12,50").is_err());
        assert!(parse_amount(" 1.0").is_err());
    }

    #[test]
    fn rejects_non_finite_amounts() {
        for raw in ["inf", "-inf", "NaN", "infinity"] {
            let err = parse_amount(raw).unwrap_err();
            assert_eq!(err.field, AMOUNT_FIELD, "{raw} should be rejected");
        }
    }

    #[test]
    fn validate_builds_transaction_from_fields() {
        let id = Uuid::new_v4();
        let req = request(&id.to_string(), "100.50");

        let tx = req.validate().unwrap();
        assert_eq!(tx.id, id);
        assert_eq!(tx.amount, 100.5);
        assert_eq!(tx.timestamp, req.timestamp);
    }

    #[test]
    fn validate_reports_identifier_before_amount() {
        let err = request("bad", "also-bad").validate().unwrap_err();
        assert_eq!(err.field, TRANSACTION_ID_FIELD);
    }

    #[test]
    fn request_ignores_unknown_fields() {
        let parsed: TransactionRequest = serde_json::from_str(
            r#"{"transactionId":"x","amount":"1","timestamp":"2024-01-02T03:04:05+02:00","extra":true}"#,
        )
        .expect("valid payload");

        assert_eq!(parsed.transaction_id, "x");
        assert_eq!(parsed.timestamp.to_rfc3339(), "2024-01-02T01:04:05+00:00");
    }

    #[test]
    fn request_requires_all_fields() {
        let parsed =
            serde_json::from_str::<TransactionRequest>(r#"{"transactionId":"x","amount":"1"}"#);
        assert!(parsed.is_err());
    }
}
