use crate::error::{ReqSigError, ReqSigResult};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<sha2::Sha256>;

/* -------------------------------- */
/// Shared key for request signature, derived from the raw bytes of a credential secret.
pub enum SharedKey {
  /// hmac-sha256
  HmacSha256(Vec<u8>),
}

impl SharedKey {
  /// Create a new shared key from the secret string as is, i.e., without decoding
  pub fn from_secret(secret: &str) -> Self {
    SharedKey::HmacSha256(secret.as_bytes().to_vec())
  }

  /// Sign the data
  pub fn sign(&self, data: &[u8]) -> ReqSigResult<Vec<u8>> {
    match self {
      SharedKey::HmacSha256(key) => {
        let mut mac = HmacSha256::new_from_slice(key).map_err(|e| ReqSigError::InvalidKey(e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
      }
    }
  }

  /// Sign the data and encode the mac in standard base64 with padding
  pub fn sign_base64(&self, data: &[u8]) -> ReqSigResult<String> {
    let mac = self.sign(data)?;
    Ok(general_purpose::STANDARD.encode(mac))
  }

  /// Check the claimed base64 mac against the one calculated over the data.
  /// Comparison runs in constant time over the encoded strings.
  pub fn verify_base64(&self, data: &[u8], claimed_mac: &str) -> ReqSigResult<bool> {
    let calculated_mac = self.sign_base64(data)?;
    Ok(calculated_mac.as_bytes().ct_eq(claimed_mac.as_bytes()).into())
  }
}

impl std::fmt::Debug for SharedKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SharedKey::HmacSha256(_) => write!(f, "SharedKey::HmacSha256(..)"),
    }
  }
}
