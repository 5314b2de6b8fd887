use crate::{
  canonical::{CanonicalString, KEY_PARAM, SIGNATURE_PARAM, TIMESTAMP_PARAM},
  clock::{Clock, SystemClock},
  credential::{Credential, CredentialStore},
  error::{ReqSigError, ReqSigResult},
  params::ParameterMap,
  trace::*,
};

/* ---------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Auth metadata (auth hash) produced by signing, transmitted along with the request
pub struct AuthMetadata {
  /// base64 encoded hmac-sha256 over the canonical string
  pub signature: String,
  /// public key id of the signer
  pub public_id: String,
  /// unix timestamp the signature was made at
  pub timestamp: u64,
}

impl AuthMetadata {
  /// The `key`, `timestamp` and `signature` wire parameters
  pub fn to_parameters(&self) -> ParameterMap {
    ParameterMap::from([
      (KEY_PARAM, self.public_id.clone()),
      (TIMESTAMP_PARAM, self.timestamp.to_string()),
      (SIGNATURE_PARAM, self.signature.clone()),
    ])
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Signing state of a [`SignedRequest`]
pub enum SignatureState {
  #[default]
  Unsigned,
  Signed(AuthMetadata),
}

/* ---------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Request content covered by the signature: path, parameters and an optional body.
///
/// The sender signs it with [`SignedRequest::sign`] and transmits [`SignedRequest::signed_parameters`].
/// The receiver rebuilds it from the received path, parameters and body, and calls
/// [`SignedRequest::authenticate`].
/// Changing any signed content resets the state to [`SignatureState::Unsigned`].
pub struct SignedRequest {
  path: String,
  parameters: ParameterMap,
  body: Option<String>,
  state: SignatureState,
}

impl SignedRequest {
  /// Create a new unsigned request without body
  pub fn new(path: impl Into<String>, parameters: ParameterMap) -> Self {
    Self {
      path: path.into(),
      parameters,
      body: None,
      state: SignatureState::Unsigned,
    }
  }

  /// Create a new unsigned request with body
  pub fn with_body(path: impl Into<String>, parameters: ParameterMap, body: impl Into<String>) -> Self {
    let mut req = Self::new(path, parameters);
    req.body = Some(body.into());
    req
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn parameters(&self) -> &ParameterMap {
    &self.parameters
  }

  pub fn body(&self) -> Option<&str> {
    self.body.as_deref()
  }

  pub fn state(&self) -> &SignatureState {
    &self.state
  }

  pub fn is_signed(&self) -> bool {
    matches!(self.state, SignatureState::Signed(_))
  }

  /// Set path
  pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
    self.path = path.into();
    self.state = SignatureState::Unsigned;
    self
  }

  /// Replace all parameters
  pub fn set_parameters(&mut self, parameters: ParameterMap) -> &mut Self {
    self.parameters = parameters;
    self.state = SignatureState::Unsigned;
    self
  }

  /// Insert a single parameter
  pub fn insert_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.parameters.insert(key, value);
    self.state = SignatureState::Unsigned;
    self
  }

  /// Set or clear body
  pub fn set_body(&mut self, body: Option<String>) -> &mut Self {
    self.body = body;
    self.state = SignatureState::Unsigned;
    self
  }

  /// Canonical string this request would be signed over with the given signer info
  pub fn canonical_string(&self, timestamp: &str, public_id: &str) -> CanonicalString {
    CanonicalString::new(&self.path, &self.parameters, timestamp, public_id, self.body.as_deref())
  }

  /// Sign with the current wall-clock time
  pub fn sign(&mut self, credential: &Credential) -> ReqSigResult<AuthMetadata> {
    self.sign_with_clock(credential, &SystemClock)
  }

  /// Sign with the timestamp read from the given clock. Signing again overwrites the metadata.
  pub fn sign_with_clock(&mut self, credential: &Credential, clock: &impl Clock) -> ReqSigResult<AuthMetadata> {
    let timestamp = clock.now();
    let canonical = self.canonical_string(&timestamp.to_string(), credential.public_id());
    let signature = credential.shared_key().sign_base64(&canonical.as_bytes())?;
    debug!(public_id = credential.public_id(), timestamp, "Signed request for {}", self.path);

    let metadata = AuthMetadata {
      signature,
      public_id: credential.public_id().to_string(),
      timestamp,
    };
    self.state = SignatureState::Signed(metadata.clone());
    Ok(metadata)
  }

  /// Auth metadata of the last signing
  pub fn auth_metadata(&self) -> ReqSigResult<&AuthMetadata> {
    match &self.state {
      SignatureState::Signed(metadata) => Ok(metadata),
      SignatureState::Unsigned => Err(ReqSigError::NotSignedYet),
    }
  }

  /// Caller parameters with `key`, `timestamp` and `signature` merged in, ready for transmission
  pub fn signed_parameters(&self) -> ReqSigResult<ParameterMap> {
    let metadata = self.auth_metadata()?;
    let mut merged = self.parameters.clone();
    merged.extend(metadata.to_parameters());
    Ok(merged)
  }

  /// Public key id claimed by the received parameters, used to resolve the credential
  pub fn claimed_key(&self) -> Option<&str> {
    self.parameters.get_normalized(KEY_PARAM)
  }

  /// Check the received `signature` parameter against the one the credential would produce for
  /// the received content, claimed `key` and claimed `timestamp`.
  ///
  /// The credential must be the one registered for the claimed `key`; this is not checked here.
  /// Returns `Ok(false)` on mismatch and [`ReqSigError::MalformedRequest`] when a wire field is absent.
  pub fn authenticate(&self, credential: &Credential) -> ReqSigResult<bool> {
    let claimed_key = self.required_param(KEY_PARAM)?;
    let claimed_timestamp = self.required_param(TIMESTAMP_PARAM)?;
    let claimed_signature = self.required_param(SIGNATURE_PARAM)?;

    let canonical = self.canonical_string(claimed_timestamp, claimed_key);
    let verified = credential
      .shared_key()
      .verify_base64(&canonical.as_bytes(), claimed_signature)?;
    if verified {
      debug!(public_id = claimed_key, timestamp = claimed_timestamp, "Verified request for {}", self.path);
    } else {
      debug!(public_id = claimed_key, timestamp = claimed_timestamp, "Signature mismatch for {}", self.path);
    }
    Ok(verified)
  }

  /// Resolve the credential for the claimed `key` from the store, then [`SignedRequest::authenticate`]
  pub fn authenticate_with(&self, store: &impl CredentialStore) -> ReqSigResult<bool> {
    let claimed_key = self.required_param(KEY_PARAM)?;
    let credential = store.lookup(claimed_key)?;
    self.authenticate(&credential)
  }

  fn required_param(&self, name: &str) -> ReqSigResult<&str> {
    self.parameters.get_normalized(name).ok_or_else(|| {
      warn!("Missing `{}` parameter in request for {}", name, self.path);
      ReqSigError::MalformedRequest(name.to_string())
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{clock::FixedClock, credential::StaticCredentialStore};

  const CLOCK: FixedClock = FixedClock(1234);

  fn credential() -> Credential {
    Credential::new("key", "secret")
  }

  fn request() -> SignedRequest {
    SignedRequest::new("/some/path", ParameterMap::from([("query", "params"), ("go", "here")]))
  }

  fn received(req: &SignedRequest) -> SignedRequest {
    let mut received = SignedRequest::new(req.path(), req.signed_parameters().unwrap());
    received.set_body(req.body().map(|b| b.to_string()));
    received
  }

  #[test]
  fn starts_unsigned() {
    let req = request();
    assert_eq!(req.state(), &SignatureState::Unsigned);
    assert!(matches!(req.auth_metadata(), Err(ReqSigError::NotSignedYet)));
    assert!(matches!(req.signed_parameters(), Err(ReqSigError::NotSignedYet)));
  }

  #[test]
  fn sign_stores_metadata() {
    let mut req = request();
    let metadata = req.sign_with_clock(&credential(), &CLOCK).unwrap();
    assert!(req.is_signed());
    assert_eq!(req.auth_metadata().unwrap(), &metadata);
    assert_eq!(metadata.public_id, "key");
    assert_eq!(metadata.timestamp, 1234);
    assert_eq!(metadata.signature, "HFGEMrVtuoawgUD0WDTAM/x0bQ6H56uX/tt51zSrZO8=");
  }

  #[test]
  fn resign_overwrites_metadata() {
    let mut req = request();
    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    let later = req.sign_with_clock(&credential(), &FixedClock(1235)).unwrap();
    assert_eq!(req.auth_metadata().unwrap(), &later);
    assert_eq!(later.timestamp, 1235);
  }

  #[test]
  fn sign_with_system_clock() {
    let mut req = request();
    let metadata = req.sign(&credential()).unwrap();
    assert!(metadata.timestamp > 0);
    assert!(received(&req).authenticate(&credential()).unwrap());
  }

  #[test]
  fn mutation_resets_state() {
    let mut req = request();
    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    req.set_path("/other");
    assert!(!req.is_signed());

    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    req.insert_parameter("x", "y");
    assert!(!req.is_signed());

    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    req.set_body(Some("body".to_string()));
    assert!(!req.is_signed());

    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    req.set_parameters(ParameterMap::new());
    assert!(!req.is_signed());
  }

  #[test]
  fn signed_parameters_merge_wire_fields() {
    let mut req = request();
    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    let merged = req.signed_parameters().unwrap();
    assert_eq!(merged.get("query"), Some("params"));
    assert_eq!(merged.get("go"), Some("here"));
    assert_eq!(merged.get("key"), Some("key"));
    assert_eq!(merged.get("timestamp"), Some("1234"));
    assert_eq!(merged.get("signature"), Some("HFGEMrVtuoawgUD0WDTAM/x0bQ6H56uX/tt51zSrZO8="));
  }

  #[test]
  fn round_trip_with_and_without_body() {
    let mut req = request();
    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    assert!(received(&req).authenticate(&credential()).unwrap());

    let mut req = SignedRequest::with_body("/upload", ParameterMap::from([("a", "b")]), "payload");
    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    assert!(received(&req).authenticate(&credential()).unwrap());
  }

  #[test]
  fn wrong_secret_fails() {
    let mut req = request();
    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    let impostor = Credential::new("key", "not-the-secret");
    assert!(!received(&req).authenticate(&impostor).unwrap());
  }

  #[test]
  fn tampering_is_detected() {
    let mut req = SignedRequest::with_body("/some/path", ParameterMap::from([("query", "params")]), "body");
    req.sign_with_clock(&credential(), &CLOCK).unwrap();

    let mut tampered = received(&req);
    tampered.set_path("/some/other/path");
    assert!(!tampered.authenticate(&credential()).unwrap());

    let mut tampered = received(&req);
    tampered.insert_parameter("query", "other");
    assert!(!tampered.authenticate(&credential()).unwrap());

    let mut tampered = received(&req);
    tampered.set_body(Some("bodx".to_string()));
    assert!(!tampered.authenticate(&credential()).unwrap());

    let mut tampered = received(&req);
    tampered.set_body(None);
    assert!(!tampered.authenticate(&credential()).unwrap());

    let mut tampered = received(&req);
    tampered.insert_parameter("timestamp", "1235");
    assert!(!tampered.authenticate(&credential()).unwrap());

    let mut tampered = received(&req);
    tampered.insert_parameter("extra", "1");
    assert!(!tampered.authenticate(&credential()).unwrap());
  }

  #[test]
  fn missing_wire_fields_are_malformed() {
    for missing in [KEY_PARAM, TIMESTAMP_PARAM, SIGNATURE_PARAM] {
      let mut req = request();
      req.sign_with_clock(&credential(), &CLOCK).unwrap();
      let mut params = req.signed_parameters().unwrap();
      params.remove(missing);
      let res = SignedRequest::new(req.path(), params).authenticate(&credential());
      assert!(matches!(res, Err(ReqSigError::MalformedRequest(name)) if name == missing));
    }
  }

  #[test]
  fn wire_fields_are_found_case_insensitively() {
    let mut req = request();
    let metadata = req.sign_with_clock(&credential(), &CLOCK).unwrap();
    let mut params = ParameterMap::from([("query", "params"), ("go", "here")]);
    params.insert("Key", metadata.public_id);
    params.insert("TIMESTAMP", metadata.timestamp.to_string());
    params.insert("Signature", metadata.signature);
    let received = SignedRequest::new("/some/path", params);
    assert_eq!(received.claimed_key(), Some("key"));
    assert!(received.authenticate(&credential()).unwrap());
  }

  #[test]
  fn caller_signature_parameter_is_ignored() {
    let mut plain = request();
    let mut with_sig = request();
    with_sig.insert_parameter("signature", "forged");
    let a = plain.sign_with_clock(&credential(), &CLOCK).unwrap();
    let b = with_sig.sign_with_clock(&credential(), &CLOCK).unwrap();
    assert_eq!(a.signature, b.signature);
    assert!(received(&with_sig).authenticate(&credential()).unwrap());
  }

  #[test]
  fn authenticate_with_store() {
    let store = StaticCredentialStore::new([("key", "secret"), ("other", "another")]);
    let mut req = request();
    req.sign_with_clock(&credential(), &CLOCK).unwrap();
    assert!(received(&req).authenticate_with(&store).unwrap());

    let mut req = request();
    req.sign_with_clock(&Credential::new("ghost", "boo"), &CLOCK).unwrap();
    let res = received(&req).authenticate_with(&store);
    assert!(matches!(res, Err(ReqSigError::UnknownCredential(id)) if id == "ghost"));
  }

  #[test]
  fn unsigned_request_cannot_authenticate_with_store() {
    let store = StaticCredentialStore::new([("key", "secret")]);
    let res = request().authenticate_with(&store);
    assert!(matches!(res, Err(ReqSigError::MalformedRequest(name)) if name == KEY_PARAM));
  }
}
