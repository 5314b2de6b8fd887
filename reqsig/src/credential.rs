use crate::{
  crypto::SharedKey,
  error::{ReqSigError, ReqSigResult},
};
use rustc_hash::FxHashMap;

/* ---------------------------------------- */
#[derive(Clone, PartialEq, Eq)]
/// Pair of a public key id and a shared secret identifying a signing party.
/// Immutable once built.
pub struct Credential {
  public_id: String,
  secret: String,
}

impl Credential {
  /// Create a new credential from the public key id and the secret
  pub fn new(public_id: impl Into<String>, secret: impl Into<String>) -> Self {
    Self {
      public_id: public_id.into(),
      secret: secret.into(),
    }
  }

  /// Public key id, sent along with the request as `key`
  pub fn public_id(&self) -> &str {
    &self.public_id
  }

  /// Shared secret
  pub fn secret(&self) -> &str {
    &self.secret
  }

  /// Keyed hash instance built from the secret
  pub(crate) fn shared_key(&self) -> SharedKey {
    SharedKey::from_secret(&self.secret)
  }
}

impl std::fmt::Debug for Credential {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credential")
      .field("public_id", &self.public_id)
      .field("secret", &"<redacted>")
      .finish()
  }
}

/* ---------------------------------------- */
/// Resolves the credential for the public key id claimed by a received request.
///
/// Implementations may be backed by a database, a configuration file or any other secret store.
pub trait CredentialStore {
  /// Look up the credential registered for `public_id`.
  /// Returns [`ReqSigError::UnknownCredential`] when nothing is registered.
  fn lookup(&self, public_id: &str) -> ReqSigResult<Credential>;
}

#[derive(Debug, Clone, Default)]
/// In-memory credential store
pub struct StaticCredentialStore {
  secrets: FxHashMap<String, String>,
}

impl StaticCredentialStore {
  /// Create a new store from `(public_id, secret)` pairs
  pub fn new<I, K, S>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: Into<String>,
  {
    Self {
      secrets: pairs.into_iter().map(|(k, s)| (k.into(), s.into())).collect(),
    }
  }

  /// Register a credential, replacing any secret already stored for its public id
  pub fn insert(&mut self, credential: Credential) -> &mut Self {
    self.secrets.insert(credential.public_id, credential.secret);
    self
  }

  pub fn len(&self) -> usize {
    self.secrets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.secrets.is_empty()
  }
}

impl CredentialStore for StaticCredentialStore {
  fn lookup(&self, public_id: &str) -> ReqSigResult<Credential> {
    self
      .secrets
      .get(public_id)
      .map(|secret| Credential::new(public_id, secret.as_str()))
      .ok_or_else(|| ReqSigError::UnknownCredential(public_id.to_string()))
  }
}

impl FromIterator<Credential> for StaticCredentialStore {
  fn from_iter<T: IntoIterator<Item = Credential>>(iter: T) -> Self {
    let mut store = Self::default();
    iter.into_iter().for_each(|c| {
      store.insert(c);
    });
    store
  }
}
