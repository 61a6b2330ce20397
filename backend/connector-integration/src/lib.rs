//! Postfinance hosted-payment-page integration.
//!
//! Two pieces do the actual work: the signature codec in [`signature`],
//! which canonicalizes and signs parameter sets with the per-direction
//! shared secrets, and the [`Postfinance`] connector, which builds the
//! outbound redirect and drives the accept/decline/exception/cancel
//! callback state machine over an external payment record.

pub mod configs;
pub mod connectors;
pub mod signature;

pub use connectors::Postfinance;
