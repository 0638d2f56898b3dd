use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine as _, alphabet};
use graph_domain::{Error, Result};
use hmac::Mac;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app_secret_proof::keyed_mac;

const SUPPORTED_ALGORITHM: &str = "HMAC-SHA256";

/// URL-safe base64 that accepts input with or without padding and with
/// non-zero trailing bits.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Parses a `<base64url signature>.<base64url JSON payload>` signed request,
/// verifies it against `app_secret` and decodes the payload into `T`.
///
/// # Errors
/// [`Error::SignedRequestParsing`] when the input is malformed, uses an
/// unsupported algorithm or does not decode into `T`;
/// [`Error::SignedRequestVerification`] when the signature does not match.
pub fn parse_signed_request<T: DeserializeOwned>(signed_request: &str, app_secret: &str) -> Result<T> {
    let (encoded_signature, encoded_payload) = signed_request
        .trim()
        .split_once('.')
        .filter(|(signature, payload)| {
            !signature.is_empty() && !payload.is_empty() && !payload.contains('.')
        })
        .ok_or_else(|| {
            Error::SignedRequestParsing(
                "Signed request is expected to be a signature and payload separated by a period"
                    .to_string(),
            )
        })?;

    let signature = URL_SAFE_LENIENT
        .decode(encoded_signature)
        .map_err(|e| Error::SignedRequestParsing(format!("Signature is not valid base64: {e}")))?;
    // Several encodings decode to the same bytes; only the canonical one was signed.
    let canonical = URL_SAFE_LENIENT.encode(&signature) == encoded_signature.trim_end_matches('=');
    let payload = URL_SAFE_LENIENT
        .decode(encoded_payload)
        .map_err(|e| Error::SignedRequestParsing(format!("Payload is not valid base64: {e}")))?;

    let payload: Value = serde_json::from_slice(&payload)
        .map_err(|e| Error::SignedRequestParsing(format!("Payload is not valid JSON: {e}")))?;

    let algorithm = payload
        .get("algorithm")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !algorithm.eq_ignore_ascii_case(SUPPORTED_ALGORITHM) {
        return Err(Error::SignedRequestParsing(format!(
            "Unknown signed request algorithm '{algorithm}', expected {SUPPORTED_ALGORITHM}"
        )));
    }

    // The signature covers the encoded payload, not the decoded JSON.
    let mut mac = keyed_mac(app_secret)?;
    mac.update(encoded_payload.as_bytes());
    if !canonical || mac.verify_slice(&signature).is_err() {
        return Err(Error::SignedRequestVerification(
            "Signature does not match; was the request made for the app identified by this secret?"
                .to_string(),
        ));
    }

    serde_json::from_value(payload).map_err(|e| {
        Error::SignedRequestParsing(format!("Unable to map signed request payload: {e}"))
    })
}
