use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, StorageError};

/// Lifecycle status of a payment record.
///
/// `Pending` is the only non-terminal state; the callback handlers move a
/// payment into exactly one of the terminal states and never out of it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Currency description as far as the gateway cares: the ISO code that is
/// signed and sent, and the number of minor units per major unit used for
/// the amount conversion (100 for CHF, 1 for zero-decimal currencies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub subunits: u32,
}

impl Currency {
    pub fn new(code: impl Into<String>, subunits: u32) -> Self {
        Self {
            code: code.into(),
            subunits,
        }
    }
}

/// Why a callback resolved to a non-successful status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    #[error("signature verification failed")]
    SignatureMismatch,
    #[error("gateway reported an error (NCERROR: {})", .ncerror.as_deref().unwrap_or("n/a"))]
    GatewayReportedError { ncerror: Option<String> },
    #[error("unrecognized gateway status `{raw}`")]
    UnrecognizedStatus { raw: String },
    #[error("acquirer declined the authorization")]
    Declined,
    #[error("payment result is uncertain")]
    Uncertain,
}

/// Result of processing one gateway callback: the status the payment ended
/// up in, plus the failure detail the caller may render or log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub status: PaymentStatus,
    pub reason: Option<FailureReason>,
}

impl CallbackOutcome {
    pub fn completed() -> Self {
        Self {
            status: PaymentStatus::Completed,
            reason: None,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: PaymentStatus::Cancelled,
            reason: None,
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        Self {
            status: PaymentStatus::Failed,
            reason: Some(reason),
        }
    }
}

/// External payment store collaborator.
///
/// The connector only ever drives one `set_status` + `save` pair per
/// callback; ownership of the record's lifecycle stays with the store.
pub trait PaymentRecord {
    fn id(&self) -> &str;
    /// Amount in major currency units.
    fn amount(&self) -> f64;
    fn currency(&self) -> &Currency;
    fn status(&self) -> PaymentStatus;
    fn set_status(&mut self, status: PaymentStatus);
    fn save(&mut self) -> CustomResult<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(PaymentStatus::Completed).unwrap(),
            serde_json::json!("completed")
        );
        assert_eq!(PaymentStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn failure_reason_carries_gateway_error_code() {
        let reason = FailureReason::GatewayReportedError {
            ncerror: Some("50001111".to_string()),
        };
        assert_eq!(
            reason.to_string(),
            "gateway reported an error (NCERROR: 50001111)"
        );
    }
}
