//! # reqsig
//!
//! Shared-secret signing of requests. A sender canonicalizes the path, the parameters, an optional
//! body and a timestamp into a deterministic string, signs it with hmac-sha256, and transmits the
//! base64 signature together with its public key id and the timestamp as the `signature`, `key` and
//! `timestamp` parameters. A receiver holding the same secret rebuilds the string from what it
//! received and compares the signatures in constant time.
//!
//! Transport, secret storage and the clock are left to the caller, see [`prelude::CredentialStore`]
//! and [`prelude::Clock`].

mod canonical;
mod clock;
mod credential;
mod crypto;
mod error;
mod params;
mod signed_request;
mod trace;

pub mod prelude {
  pub use crate::{
    canonical::{canonicalize, CanonicalString, KEY_PARAM, SIGNATURE_PARAM, TIMESTAMP_PARAM},
    clock::{Clock, FixedClock, SystemClock},
    credential::{Credential, CredentialStore, StaticCredentialStore},
    crypto::SharedKey,
    error::{ReqSigError, ReqSigResult},
    params::ParameterMap,
    signed_request::{AuthMetadata, SignatureState, SignedRequest},
  };
}

/* ----------------------------------------------------------------- */
