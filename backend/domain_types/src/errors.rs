use error_stack::Report;

/// Result type carrying an `error_stack` report, used at every fallible
/// seam of the connector.
pub type CustomResult<T, E> = Result<T, Report<E>>;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Failed to compute the request signature")]
    SignatureComputationFailed,
    #[error("Failed to persist the payment status")]
    PaymentStoreFailed,
}

/// Raised while canonicalizing a parameter set for signing.
///
/// A duplicate key indicates a malformed parameter set on the caller's
/// side; signing over it would be ambiguous, so it is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("two parameter keys collapse to `{key}` after uppercasing")]
    DuplicateKey { key: String },
}

/// Failure surfaced by the external payment store on save.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to save payment record {payment_id}")]
    SaveFailed { payment_id: String },
}
