//! SHA-1 parameter signing for the hosted payment page.
//!
//! The gateway signs by uppercasing every parameter key, sorting the keys,
//! concatenating `KEY=VALUE<secret>` for each non-empty value and hashing
//! the accumulated string. The secret acts as the per-field delimiter;
//! there is no other separator. Output is the digest as uppercase hex.
//! The quirks (case folding, dropping empty values, excluding the
//! signature field itself) are protocol-mandated and must stay bit-exact.

use std::collections::BTreeMap;

use domain_types::errors::SignatureError;
use hyperswitch_masking::{PeekInterface, Secret};
use ring::{constant_time, digest};

/// Field under which the gateway transmits its signature on callbacks.
/// Never participates in signing, whatever its casing.
pub const SHASIGN_FIELD: &str = "SHASIGN";

/// Flat string-keyed parameter set, as sent to or received from the
/// gateway. Insertion order is preserved but irrelevant for signing;
/// lookup and removal are case-insensitive to match the gateway's
/// treatment of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a raw urlencoded query string as received on the callback
    /// endpoints.
    pub fn from_query(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        Ok(pairs.into_iter().collect())
    }

    /// Appends a parameter. Keys are stored as inserted; canonicalization
    /// happens at signing time.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Case-insensitive lookup of the first matching key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Removes every entry whose key matches case-insensitively, returning
    /// the first removed value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let mut removed = None;
        self.entries.retain(|(k, v)| {
            if k.eq_ignore_ascii_case(key) {
                if removed.is_none() {
                    removed = Some(v.clone());
                }
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uppercase-folds the keys, rejects case-fold collisions and drops the
    /// signature field plus the caller-supplied exclusions. The `BTreeMap`
    /// gives the ascending byte-order iteration the protocol asks for.
    fn canonicalize(
        &self,
        excluded: &[&str],
    ) -> Result<BTreeMap<String, String>, SignatureError> {
        let mut canonical = BTreeMap::new();
        for (key, value) in &self.entries {
            let upper = key.to_ascii_uppercase();
            if upper == SHASIGN_FIELD || excluded.iter().any(|e| e.eq_ignore_ascii_case(&upper)) {
                continue;
            }
            if canonical.insert(upper.clone(), value.clone()).is_some() {
                return Err(SignatureError::DuplicateKey { key: upper });
            }
        }
        Ok(canonical)
    }
}

impl FromIterator<(String, String)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Computes the signature over `params` with the given direction secret
/// (SHA-IN for outbound requests, SHA-OUT for callbacks).
///
/// `excluded` names transport artifacts that must not be signed over; the
/// signature field itself is always excluded. An empty or all-empty set
/// signs to the digest of the empty string, which is well-defined.
pub fn compute_signature(
    params: &ParameterSet,
    secret: &Secret<String>,
    excluded: &[&str],
) -> Result<String, SignatureError> {
    let canonical = params.canonicalize(excluded)?;
    let mut accumulator = String::new();
    for (key, value) in &canonical {
        // Empty values contribute nothing, same as absent parameters.
        if value.is_empty() {
            continue;
        }
        accumulator.push_str(key);
        accumulator.push('=');
        accumulator.push_str(value);
        accumulator.push_str(secret.peek());
    }
    let digest = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, accumulator.as_bytes());
    Ok(hex::encode(digest).to_ascii_uppercase())
}

/// Verifies `candidate` against the signature computed over the full
/// received parameter set; only the signature's own field and `excluded`
/// are dropped, so tampering with any other field invalidates it.
///
/// Never panics and never errors: a set that cannot be canonicalized
/// cannot have been signed, so it verifies as `false`.
pub fn verify_signature(
    params: &ParameterSet,
    secret: &Secret<String>,
    excluded: &[&str],
    candidate: &str,
) -> bool {
    match compute_signature(params, secret, excluded) {
        Ok(expected) => {
            constant_time::verify_slices_are_equal(expected.as_bytes(), candidate.as_bytes())
                .is_ok()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> Secret<String> {
        Secret::new(s.to_string())
    }

    fn order_params() -> ParameterSet {
        [("ORDERID", "1"), ("AMOUNT", "12300"), ("CURRENCY", "CHF")]
            .into_iter()
            .collect()
    }

    // Reference vector: sha1("AMOUNT=12300KCURRENCY=CHFKORDERID=1K").
    const ORDER_SIGNATURE: &str = "E21552D3DECBF21BAF6E5D2B400E5F1A273F7D8D";

    #[test]
    fn matches_reference_vector() {
        let sig = compute_signature(&order_params(), &secret("K"), &[]).unwrap();
        assert_eq!(sig, ORDER_SIGNATURE);
    }

    #[test]
    fn empty_set_signs_to_empty_string_digest() {
        let sig = compute_signature(&ParameterSet::new(), &secret("K"), &[]).unwrap();
        assert_eq!(sig, "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709");
    }

    #[test]
    fn key_order_is_irrelevant() {
        let shuffled: ParameterSet =
            [("CURRENCY", "CHF"), ("AMOUNT", "12300"), ("ORDERID", "1")]
                .into_iter()
                .collect();
        assert_eq!(
            compute_signature(&shuffled, &secret("K"), &[]).unwrap(),
            ORDER_SIGNATURE
        );
    }

    #[test]
    fn key_case_is_irrelevant() {
        let lowercased: ParameterSet =
            [("orderid", "1"), ("amount", "12300"), ("Currency", "CHF")]
                .into_iter()
                .collect();
        assert_eq!(
            compute_signature(&lowercased, &secret("K"), &[]).unwrap(),
            ORDER_SIGNATURE
        );
    }

    #[test]
    fn empty_values_contribute_nothing() {
        let with_empty: ParameterSet = [("A", "1"), ("B", "")].into_iter().collect();
        let without: ParameterSet = [("A", "1")].into_iter().collect();
        let s = secret("S3cr3t");
        let sig = compute_signature(&with_empty, &s, &[]).unwrap();
        assert_eq!(sig, compute_signature(&without, &s, &[]).unwrap());
        assert_eq!(sig, "DD74763C785569DE85FCF18A692BF41ED7CCC0F5");
    }

    #[test]
    fn shasign_field_never_participates() {
        let mut params = order_params();
        params.insert("SHASIGN", "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF");
        params.insert("shasign", "also ignored");
        assert_eq!(
            compute_signature(&params, &secret("K"), &[]).unwrap(),
            ORDER_SIGNATURE
        );
    }

    #[test]
    fn excluded_fields_are_dropped_before_signing() {
        let mut params = order_params();
        params.insert("FORM_BUILD_ID", "form-abc123");
        params.insert("op", "Pay");
        assert_eq!(
            compute_signature(&params, &secret("K"), &["FORM_BUILD_ID", "OP"]).unwrap(),
            ORDER_SIGNATURE
        );
    }

    #[test]
    fn round_trip_verifies() {
        let s = secret("TopSecretOut");
        let params = order_params();
        let sig = compute_signature(&params, &s, &[]).unwrap();
        assert!(verify_signature(&params, &s, &[], &sig));
    }

    #[test]
    fn any_value_mutation_breaks_verification() {
        let s = secret("TopSecretOut");
        let sig = compute_signature(&order_params(), &s, &[]).unwrap();
        let tampered: ParameterSet =
            [("ORDERID", "1"), ("AMOUNT", "12301"), ("CURRENCY", "CHF")]
                .into_iter()
                .collect();
        assert!(!verify_signature(&tampered, &s, &[], &sig));
    }

    #[test]
    fn tampered_candidate_fails_verification() {
        let s = secret("K");
        let mut candidate = ORDER_SIGNATURE.to_string();
        candidate.replace_range(0..1, "F");
        assert!(!verify_signature(&order_params(), &s, &[], &candidate));
    }

    #[test]
    fn colliding_keys_are_rejected() {
        let params: ParameterSet = [("ORDERID", "1"), ("orderid", "2")].into_iter().collect();
        assert_eq!(
            compute_signature(&params, &secret("K"), &[]).unwrap_err(),
            SignatureError::DuplicateKey {
                key: "ORDERID".to_string()
            }
        );
        // A set that cannot be canonicalized cannot verify either.
        assert!(!verify_signature(&params, &secret("K"), &[], ORDER_SIGNATURE));
    }

    #[test]
    fn decodes_callback_query_strings() {
        let params =
            ParameterSet::from_query("ORDERID=42&AMOUNT=12300&CURRENCY=CHF&PM=CreditCard")
                .unwrap();
        assert_eq!(params.len(), 4);
        assert_eq!(params.get("pm"), Some("CreditCard"));
    }

    #[test]
    fn removal_is_case_insensitive_and_exhaustive() {
        let mut params: ParameterSet =
            [("SHASIGN", "AAA"), ("ShaSign", "BBB"), ("ORDERID", "1")]
                .into_iter()
                .collect();
        assert_eq!(params.remove("shasign"), Some("AAA".to_string()));
        assert_eq!(params.len(), 1);
        assert_eq!(params.remove("shasign"), None);
    }
}
