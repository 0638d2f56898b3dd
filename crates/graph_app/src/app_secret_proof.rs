use graph_domain::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Builds a keyed HMAC-SHA256 instance for `secret`.
pub(crate) fn keyed_mac(secret: &str) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::IllegalState(format!("Creation of HMAC-SHA256 failed: {e}")))
}

/// Hex-encoded HMAC-SHA256 of `access_token` keyed by `app_secret`, sent as
/// `appsecret_proof` to prove a request was made by the app's server.
pub fn app_secret_proof(access_token: &str, app_secret: &str) -> Result<String> {
    let mut mac = keyed_mac(app_secret)?;
    mac.update(access_token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_known_hmac_sha256_vector() {
        let actual = app_secret_proof("The quick brown fox jumps over the lazy dog", "key").unwrap();
        let expected = "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_proof_is_deterministic() {
        let first = app_secret_proof("user-token", "app-secret").unwrap();
        let second = app_secret_proof("user-token", "app-secret").unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first,
            "b5a94d985eb7b68467d28ca5375162d12b9ca8fe238615acc927c8a9c08d2e95"
        );
    }

    #[test]
    fn test_proof_depends_on_secret() {
        let first = app_secret_proof("user-token", "app-secret").unwrap();
        let second = app_secret_proof("user-token", "other-secret").unwrap();
        assert_ne!(first, second);
    }
}
