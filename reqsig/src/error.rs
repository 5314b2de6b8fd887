use thiserror::Error;

/// Result type for request signature
pub type ReqSigResult<T> = std::result::Result<T, ReqSigError>;

/// Error type for request signature
#[derive(Error, Debug)]
pub enum ReqSigError {
  /// Auth metadata was requested before the request was signed
  #[error("Request not signed")]
  NotSignedYet,

  /// A wire field required for verification is absent
  #[error("Malformed request, missing parameter: {0}")]
  MalformedRequest(String),

  /* ----- Credential lookup errors ----- */
  /// No secret is registered for the public id
  #[error("Unknown credential: {0}")]
  UnknownCredential(String),

  /* ----- Crypto errors ----- */
  /// The keyed hash rejected the secret
  #[error("Invalid shared key: {0}")]
  InvalidKey(String),
}
