pub mod transformers;

use domain_types::{
    errors::{ConnectorError, CustomResult},
    types::{CallbackOutcome, FailureReason, PaymentRecord},
};
use error_stack::ResultExt;
use hyperswitch_masking::Secret;
use transformers as postfinance;

use crate::{
    configs::PostfinanceConfig,
    signature::{self, ParameterSet, SHASIGN_FIELD},
};

/// Postfinance hosted-payment-page connector.
///
/// Stateless; every invocation is one request-scoped interaction. The
/// outbound side builds a signed redirect to the hosted page, the inbound
/// side verifies the callback signature and moves the payment record to
/// its terminal status. Secrets, configuration and the payment store are
/// passed in explicitly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Postfinance;

impl Postfinance {
    pub fn new() -> Self {
        Self
    }

    /// Builds the signed parameter set and the redirect form sending the
    /// customer to the hosted payment page.
    #[tracing::instrument(skip_all, fields(payment_id = payment.id()))]
    pub fn build_redirect_request(
        &self,
        payment: &dyn PaymentRecord,
        auth: &postfinance::PostfinanceAuthType,
        config: &PostfinanceConfig,
        return_urls: &postfinance::ReturnUrls,
    ) -> CustomResult<postfinance::PostfinanceRedirectForm, ConnectorError> {
        let currency = payment.currency();
        let request = postfinance::PostfinanceRedirectRequest {
            pspid: auth.pspid.clone(),
            order_id: payment.id().to_string(),
            amount: postfinance::calculate_amount(payment.amount(), currency.subunits),
            currency: currency.code.clone(),
            language: config.language.clone(),
            accept_url: return_urls.accept_url.clone(),
            decline_url: return_urls.decline_url.clone(),
            exception_url: return_urls.exception_url.clone(),
            cancel_url: return_urls.cancel_url.clone(),
        };

        let mut form_fields = request.to_parameter_set();
        let shasign = signature::compute_signature(&form_fields, &auth.sha_in_key, &[])
            .change_context(ConnectorError::SignatureComputationFailed)?;
        form_fields.insert(postfinance::SHASIGN_REQUEST_FIELD, shasign);

        let mut endpoint = config.payment_link.clone();
        endpoint.query_pairs_mut().extend_pairs(form_fields.iter());

        Ok(postfinance::PostfinanceRedirectForm {
            endpoint,
            form_fields,
        })
    }

    /// Accept channel: statuses 5/9 (and, historically, pending 51/91)
    /// land here. The SHASIGN field is stripped and verified against the
    /// remaining fields before the status is trusted.
    #[tracing::instrument(
        skip_all,
        fields(payment_id = payment.id(), gateway_status = params.get("STATUS"))
    )]
    pub fn handle_accept_callback(
        &self,
        mut params: ParameterSet,
        sha_out_key: &Secret<String>,
        payment: &mut dyn PaymentRecord,
    ) -> CustomResult<CallbackOutcome, ConnectorError> {
        let candidate = params.remove(SHASIGN_FIELD).unwrap_or_default();
        if !signature::verify_signature(&params, sha_out_key, &[], &candidate) {
            return self.finalize(
                payment,
                CallbackOutcome::failed(FailureReason::SignatureMismatch),
            );
        }
        let outcome = postfinance::interpret_accept_status(&params);
        self.finalize(payment, outcome)
    }

    /// Decline channel: the gateway only invokes it with status 2, so the
    /// status is informational and the outcome is always failure.
    #[tracing::instrument(
        skip_all,
        fields(payment_id = payment.id(), gateway_status = params.get("STATUS"))
    )]
    pub fn handle_decline_callback(
        &self,
        params: ParameterSet,
        payment: &mut dyn PaymentRecord,
    ) -> CustomResult<CallbackOutcome, ConnectorError> {
        self.finalize(payment, CallbackOutcome::failed(FailureReason::Declined))
    }

    /// Exception channel: uncertain results (52/92). Resolved
    /// conservatively to failure.
    #[tracing::instrument(
        skip_all,
        fields(payment_id = payment.id(), gateway_status = params.get("STATUS"))
    )]
    pub fn handle_exception_callback(
        &self,
        params: ParameterSet,
        payment: &mut dyn PaymentRecord,
    ) -> CustomResult<CallbackOutcome, ConnectorError> {
        self.finalize(payment, CallbackOutcome::failed(FailureReason::Uncertain))
    }

    /// Cancel channel: the customer backed out on the payment page
    /// (status 1).
    #[tracing::instrument(
        skip_all,
        fields(payment_id = payment.id(), gateway_status = params.get("STATUS"))
    )]
    pub fn handle_cancel_callback(
        &self,
        params: ParameterSet,
        payment: &mut dyn PaymentRecord,
    ) -> CustomResult<CallbackOutcome, ConnectorError> {
        self.finalize(payment, CallbackOutcome::cancelled())
    }

    /// Applies the outcome to the payment record: one `set_status` + one
    /// `save`. Terminal states are sticky; a replayed callback reports the
    /// stored status without touching the record again.
    fn finalize(
        &self,
        payment: &mut dyn PaymentRecord,
        outcome: CallbackOutcome,
    ) -> CustomResult<CallbackOutcome, ConnectorError> {
        if payment.status().is_terminal() {
            return Ok(CallbackOutcome {
                status: payment.status(),
                reason: None,
            });
        }
        payment.set_status(outcome.status);
        payment
            .save()
            .change_context(ConnectorError::PaymentStoreFailed)?;
        Ok(outcome)
    }
}
