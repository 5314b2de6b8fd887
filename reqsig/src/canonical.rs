use crate::params::ParameterMap;

/// Parameter carrying the signer's public key id
pub const KEY_PARAM: &str = "key";
/// Parameter carrying the signing unix timestamp
pub const TIMESTAMP_PARAM: &str = "timestamp";
/// Parameter carrying the base64 signature
pub const SIGNATURE_PARAM: &str = "signature";

/// Canonical string
///
/// Deterministic serialization of the signed content of a request:
/// ```text
/// <path>\n<k1>=<v1>&<k2>=<v2>...[\n<body>]
/// ```
/// Keys are lowercased and sorted in byte order. `key` and `timestamp` are always taken from the
/// signer, overriding caller parameters of the same name, and `signature` never takes part.
/// Keys and values are not url-encoded, so values containing `&`, `=` or a newline can make two
/// different parameter sets serialize identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalString {
  path: String,
  query: String,
  body: Option<String>,
}

impl CanonicalString {
  /// Build the canonical string. `timestamp` is used verbatim, so the verifier can pass the
  /// string it received.
  pub fn new(path: &str, parameters: &ParameterMap, timestamp: &str, public_id: &str, body: Option<&str>) -> Self {
    let mut augmented = parameters.normalized();
    augmented.remove(SIGNATURE_PARAM);
    augmented.insert(KEY_PARAM.to_string(), public_id.to_string());
    augmented.insert(TIMESTAMP_PARAM.to_string(), timestamp.to_string());

    let query = augmented
      .iter()
      .map(|(k, v)| format!("{k}={v}"))
      .collect::<Vec<_>>()
      .join("&");

    Self {
      path: path.to_string(),
      query,
      body: body.filter(|b| !b.is_empty()).map(|b| b.to_string()),
    }
  }

  /// Sorted `key=value` pairs joined with `&`
  pub fn query(&self) -> &str {
    &self.query
  }

  /// Returns the canonical string as bytes to be signed
  pub fn as_bytes(&self) -> Vec<u8> {
    self.to_string().into_bytes()
  }
}

impl std::fmt::Display for CanonicalString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}\n{}", self.path, self.query)?;
    if let Some(body) = &self.body {
      write!(f, "\n{body}")?;
    }
    Ok(())
  }
}

/// Canonical string of the given request content as a plain string
pub fn canonicalize(path: &str, parameters: &ParameterMap, timestamp: &str, public_id: &str, body: Option<&str>) -> String {
  CanonicalString::new(path, parameters, timestamp, public_id, body).to_string()
}
