use reqsig::prelude::ReqSigError;
use thiserror::Error;

/// Result type for request signature for hyper
pub type HyperSigResult<T> = std::result::Result<T, HyperSigError>;

/// Error type for request signature for hyper
#[derive(Error, Debug)]
pub enum HyperSigError {
  /// No `key`, `timestamp` and `signature` query parameters found
  #[error("No signature params found: {0}")]
  NoSignatureParams(String),

  /// Invalid signature
  #[error("Invalid signature: {0}")]
  InvalidSignature(String),

  /// Http body error
  #[error("Http body error: {0}")]
  HttpBodyError(String),

  /// Body is not a utf-8 string
  #[error("Body is not valid utf-8: {0}")]
  NonUtf8Body(#[from] std::str::Utf8Error),

  /// Query could not be percent-decoded
  #[error("Invalid query: {0}")]
  InvalidQuery(String),

  /// Failed to rebuild the uri with the signed query
  #[error("Invalid uri: {0}")]
  InvalidUri(#[from] http::uri::InvalidUri),

  /// Failed to rebuild the uri with the signed query
  #[error("Invalid uri parts: {0}")]
  InvalidUriParts(#[from] http::uri::InvalidUriParts),

  /// Inherited from ReqSigError
  #[error("ReqSigError: {0}")]
  ReqSigError(#[from] ReqSigError),
}
