use crate::error::{HyperSigError, HyperSigResult};
use bytes::{Buf, Bytes};
use http::{uri::PathAndQuery, Request, Uri};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqsig::prelude::{
  Clock, Credential, CredentialStore, ParameterMap, SignedRequest, SystemClock, KEY_PARAM, SIGNATURE_PARAM, TIMESTAMP_PARAM,
};
use std::future::Future;
use tracing::{debug, warn};

/// Everything but unreserved characters is escaped, so `+`, `/` and `=` of base64 survive
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/* --------------------------------------- */
/// A trait about the shared-secret signature carried in the query of a request
pub trait RequestSignature {
  type Error;

  /// Check if the query has `key`, `timestamp` and `signature` parameters
  fn has_request_signature(&self) -> bool;

  /// Extract the public key id claimed by the query
  fn get_key_id(&self) -> Option<String>;

  /// Sign the path, query and body with the current time, and merge the auth metadata into the query.
  /// The body is buffered and handed back in the returned request.
  fn set_request_signature(
    self,
    credential: &Credential,
  ) -> impl Future<Output = Result<Request<Full<Bytes>>, Self::Error>> + Send
  where
    Self: Sized;

  /// Same as `set_request_signature` with the timestamp taken from the given clock
  fn set_request_signature_with_clock<C>(
    self,
    credential: &Credential,
    clock: &C,
  ) -> impl Future<Output = Result<Request<Full<Bytes>>, Self::Error>> + Send
  where
    Self: Sized,
    C: Clock + Sync;

  /// Verify the signature in the query with the credential resolved from the store by the claimed key id.
  /// Returns the request with its buffered body if the signature is valid, and Err otherwise.
  fn verify_request_signature<S>(
    self,
    credential_store: &S,
  ) -> impl Future<Output = Result<Request<Full<Bytes>>, Self::Error>> + Send
  where
    Self: Sized,
    S: CredentialStore + Sync;
}

/* --------------------------------------- */
#[cfg(feature = "blocking")]
/// Synchronous counterpart of [`RequestSignature`].
///
/// Every method delegates to the corresponding async method via `futures::executor::block_on`.
///
/// # Panics
///
/// All methods will panic if called from within an async runtime (e.g. a `tokio` task).
/// Use the async [`RequestSignature`] methods instead when you are already in an async context.
pub trait RequestSignatureSync: RequestSignature {
  fn set_request_signature_sync(self, credential: &Credential) -> Result<Request<Full<Bytes>>, Self::Error>
  where
    Self: Sized;

  fn set_request_signature_with_clock_sync<C>(
    self,
    credential: &Credential,
    clock: &C,
  ) -> Result<Request<Full<Bytes>>, Self::Error>
  where
    Self: Sized,
    C: Clock + Sync;

  fn verify_request_signature_sync<S>(self, credential_store: &S) -> Result<Request<Full<Bytes>>, Self::Error>
  where
    Self: Sized,
    S: CredentialStore + Sync;
}

/* --------------------------------------- */
impl<B> RequestSignature for Request<B>
where
  B: Body + Send,
  <B as Body>::Data: Send,
  <B as Body>::Error: std::fmt::Display,
{
  type Error = HyperSigError;

  fn has_request_signature(&self) -> bool {
    let Ok(params) = parse_query(self.uri().query()) else {
      return false;
    };
    [KEY_PARAM, TIMESTAMP_PARAM, SIGNATURE_PARAM]
      .iter()
      .all(|name| params.get_normalized(name).is_some())
  }

  fn get_key_id(&self) -> Option<String> {
    parse_query(self.uri().query())
      .ok()?
      .get_normalized(KEY_PARAM)
      .map(|v| v.to_string())
  }

  async fn set_request_signature(self, credential: &Credential) -> HyperSigResult<Request<Full<Bytes>>>
  where
    Self: Sized,
  {
    self.set_request_signature_with_clock(credential, &SystemClock).await
  }

  async fn set_request_signature_with_clock<C>(
    self,
    credential: &Credential,
    clock: &C,
  ) -> HyperSigResult<Request<Full<Bytes>>>
  where
    Self: Sized,
    C: Clock + Sync,
  {
    let (mut parts, body) = self.into_parts();
    let body_bytes = into_bytes(body).await?;

    let mut signed_request = build_signed_request(&parts.uri, &body_bytes)?;
    signed_request.sign_with_clock(credential, clock)?;
    let signed_parameters = signed_request.signed_parameters()?;
    parts.uri = replace_query(&parts.uri, &signed_parameters)?;
    debug!(public_id = credential.public_id(), "Set request signature to {}", parts.uri);

    Ok(Request::from_parts(parts, Full::new(body_bytes)))
  }

  async fn verify_request_signature<S>(self, credential_store: &S) -> HyperSigResult<Request<Full<Bytes>>>
  where
    Self: Sized,
    S: CredentialStore + Sync,
  {
    if !self.has_request_signature() {
      return Err(HyperSigError::NoSignatureParams(
        "The request does not have key, timestamp and signature query params".to_string(),
      ));
    }
    let (parts, body) = self.into_parts();
    let body_bytes = into_bytes(body).await?;

    let signed_request = build_signed_request(&parts.uri, &body_bytes)?;
    if !signed_request.authenticate_with(credential_store)? {
      warn!("Invalid request signature for {}", parts.uri.path());
      return Err(HyperSigError::InvalidSignature(
        "Invalid signature for the resolved credential".to_string(),
      ));
    }

    Ok(Request::from_parts(parts, Full::new(body_bytes)))
  }
}

/* --------------------------------------- */
#[cfg(feature = "blocking")]
impl<B> RequestSignatureSync for Request<B>
where
  B: Body + Send,
  <B as Body>::Data: Send,
  <B as Body>::Error: std::fmt::Display,
{
  fn set_request_signature_sync(self, credential: &Credential) -> Result<Request<Full<Bytes>>, Self::Error>
  where
    Self: Sized,
  {
    futures::executor::block_on(self.set_request_signature(credential))
  }

  fn set_request_signature_with_clock_sync<C>(
    self,
    credential: &Credential,
    clock: &C,
  ) -> Result<Request<Full<Bytes>>, Self::Error>
  where
    Self: Sized,
    C: Clock + Sync,
  {
    futures::executor::block_on(self.set_request_signature_with_clock(credential, clock))
  }

  fn verify_request_signature_sync<S>(self, credential_store: &S) -> Result<Request<Full<Bytes>>, Self::Error>
  where
    Self: Sized,
    S: CredentialStore + Sync,
  {
    futures::executor::block_on(self.verify_request_signature(credential_store))
  }
}

/* --------------------------------------- */
// inner functions
/// Returns the bytes object of the body
async fn into_bytes<B>(body: B) -> HyperSigResult<Bytes>
where
  B: Body + Send,
  <B as Body>::Data: Send,
  <B as Body>::Error: std::fmt::Display,
{
  let mut body_buf = body
    .collect()
    .await
    .map_err(|e| HyperSigError::HttpBodyError(e.to_string()))?
    .aggregate();
  Ok(body_buf.copy_to_bytes(body_buf.remaining()))
}

/// Path as signed: an empty path is `/`
fn signed_path(uri: &Uri) -> &str {
  let p = uri.path();
  if p.is_empty() {
    "/"
  } else {
    p
  }
}

/// Build the signed request from the uri path, the decoded query and the utf-8 body, where an empty body is no body
fn build_signed_request(uri: &Uri, body_bytes: &Bytes) -> HyperSigResult<SignedRequest> {
  let parameters = parse_query(uri.query())?;
  let path = signed_path(uri);
  if body_bytes.is_empty() {
    Ok(SignedRequest::new(path, parameters))
  } else {
    let body = std::str::from_utf8(body_bytes)?;
    Ok(SignedRequest::with_body(path, parameters, body))
  }
}

/// Split the raw query on `&` and then on the first `=`, and percent-decode both sides.
/// `+` is taken literally.
fn parse_query(query: Option<&str>) -> HyperSigResult<ParameterMap> {
  query
    .unwrap_or("")
    .split('&')
    .filter(|s| !s.is_empty())
    .map(|pair| -> HyperSigResult<(String, String)> {
      let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
      Ok((decode_component(k)?, decode_component(v)?))
    })
    .collect::<HyperSigResult<Vec<_>>>()
    .map(|pairs| pairs.into_iter().collect())
}

fn decode_component(s: &str) -> HyperSigResult<String> {
  percent_decode_str(s)
    .decode_utf8()
    .map(|v| v.into_owned())
    .map_err(|e| HyperSigError::InvalidQuery(e.to_string()))
}

/// Replace the query of the uri with the percent-encoded parameters
fn replace_query(uri: &Uri, parameters: &ParameterMap) -> HyperSigResult<Uri> {
  let query = parameters
    .iter()
    .map(|(k, v)| {
      format!(
        "{}={}",
        utf8_percent_encode(k, QUERY_ENCODE_SET),
        utf8_percent_encode(v, QUERY_ENCODE_SET)
      )
    })
    .collect::<Vec<_>>()
    .join("&");
  let path_and_query = PathAndQuery::try_from(format!("{}?{}", signed_path(uri), query))?;

  let mut uri_parts = uri.clone().into_parts();
  uri_parts.path_and_query = Some(path_and_query);
  Ok(Uri::from_parts(uri_parts)?)
}

/* --------------------------------------- */
#[cfg(test)]
#[path = "hyper_http_tests.rs"]
mod tests;
