use domain_types::types::{CallbackOutcome, FailureReason};
use hyperswitch_masking::{PeekInterface, Secret};
use serde::Serialize;
use url::Url;

use crate::{configs::PostfinanceConfig, signature::ParameterSet};

/// Signature field name on the request side. The gateway answers with the
/// all-uppercase `SHASIGN`; the outbound form uses this mixed casing.
pub const SHASIGN_REQUEST_FIELD: &str = "SHASign";

// Auth
#[derive(Clone, Debug)]
pub struct PostfinanceAuthType {
    pub pspid: Secret<String>,
    pub sha_in_key: Secret<String>,
    pub sha_out_key: Secret<String>,
}

impl From<&PostfinanceConfig> for PostfinanceAuthType {
    fn from(config: &PostfinanceConfig) -> Self {
        Self {
            pspid: config.pspid.clone(),
            sha_in_key: config.sha_in_key.clone(),
            sha_out_key: config.sha_out_key.clone(),
        }
    }
}

/// Absolute URLs the gateway calls back on, one per outcome channel.
#[derive(Clone, Debug)]
pub struct ReturnUrls {
    pub accept_url: Url,
    pub decline_url: Url,
    pub exception_url: Url,
    pub cancel_url: Url,
}

// Requests
#[derive(Clone, Debug, Serialize)]
pub struct PostfinanceRedirectRequest {
    #[serde(rename = "PSPID")]
    pub pspid: Secret<String>,
    #[serde(rename = "ORDERID")]
    pub order_id: String,
    /// Amount in minor currency units, truncated toward zero.
    #[serde(rename = "AMOUNT")]
    pub amount: i64,
    #[serde(rename = "CURRENCY")]
    pub currency: String,
    #[serde(rename = "LANGUAGE")]
    pub language: String,
    #[serde(rename = "ACCEPTURL")]
    pub accept_url: Url,
    #[serde(rename = "DECLINEURL")]
    pub decline_url: Url,
    #[serde(rename = "EXCEPTIONURL")]
    pub exception_url: Url,
    #[serde(rename = "CANCELURL")]
    pub cancel_url: Url,
}

impl PostfinanceRedirectRequest {
    /// Flattens the request into the parameter set the signature is
    /// computed over and the redirect form is rendered from.
    pub fn to_parameter_set(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.insert("PSPID", self.pspid.peek().as_str());
        params.insert("ORDERID", self.order_id.as_str());
        params.insert("AMOUNT", self.amount.to_string());
        params.insert("CURRENCY", self.currency.as_str());
        params.insert("LANGUAGE", self.language.as_str());
        params.insert("ACCEPTURL", self.accept_url.as_str());
        params.insert("DECLINEURL", self.decline_url.as_str());
        params.insert("EXCEPTIONURL", self.exception_url.as_str());
        params.insert("CANCELURL", self.cancel_url.as_str());
        params
    }
}

/// Signed redirect to the hosted payment page. `endpoint` carries the
/// fields as query parameters for a GET redirect; `form_fields` is the
/// same data for rendering a self-submitting POST form.
#[derive(Clone, Debug)]
pub struct PostfinanceRedirectForm {
    pub endpoint: Url,
    pub form_fields: ParameterSet,
}

// Response status codes, as documented for the order-standard flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostfinanceStatus {
    /// 1 — the customer cancelled on the payment page.
    CancelledByCustomer,
    /// 2 — the acquirer declined the authorization.
    AuthorizationDeclined,
    /// 5 — authorized.
    Authorized,
    /// 9 — payment requested (accepted).
    PaymentRequested,
    /// 51 — authorization waiting.
    AuthorizationPending,
    /// 91 — payment processing.
    PaymentPending,
    /// 52 — authorization result unknown.
    AuthorizationUncertain,
    /// 92 — payment result unknown.
    PaymentUncertain,
    /// Literal `error` sentinel.
    Error,
    Unknown(String),
}

impl From<&str> for PostfinanceStatus {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "1" => Self::CancelledByCustomer,
            "2" => Self::AuthorizationDeclined,
            "5" => Self::Authorized,
            "9" => Self::PaymentRequested,
            "51" => Self::AuthorizationPending,
            "91" => Self::PaymentPending,
            "52" => Self::AuthorizationUncertain,
            "92" => Self::PaymentUncertain,
            "error" => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Interprets the status field of an already signature-verified accept
/// callback. Only the authorized/accepted codes complete the payment;
/// everything else resolves conservatively to failure.
pub(crate) fn interpret_accept_status(params: &ParameterSet) -> CallbackOutcome {
    let raw = params.get("STATUS").unwrap_or_default();
    match PostfinanceStatus::from(raw) {
        PostfinanceStatus::Authorized | PostfinanceStatus::PaymentRequested => {
            CallbackOutcome::completed()
        }
        PostfinanceStatus::Error => CallbackOutcome::failed(FailureReason::GatewayReportedError {
            ncerror: params
                .get("NCERROR")
                .filter(|code| !code.is_empty())
                .map(str::to_string),
        }),
        _ => CallbackOutcome::failed(FailureReason::UnrecognizedStatus {
            raw: raw.to_string(),
        }),
    }
}

/// Converts a major-unit amount to the gateway's integer minor units.
///
/// Truncates toward zero, never rounds; the signed AMOUNT must match the
/// partner's own truncating conversion or the signature check fails on
/// their side.
pub fn calculate_amount(amount: f64, subunits: u32) -> i64 {
    if subunits == 0 {
        amount as i64
    } else {
        (amount * f64::from(subunits)) as i64
    }
}
