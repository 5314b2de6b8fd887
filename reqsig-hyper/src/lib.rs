//! # reqsig-hyper
//!
//! `reqsig-hyper` is a crate that provides a convenient API for `Hyper` users to handle shared-secret request signatures.
//! This crate extends hyper's http request with the ability to sign its path, query and body, carrying the
//! `key`, `timestamp` and `signature` fields in the query, and to verify them on the receiving side.
//!
//! ## Async-first design
//!
//! The primary API is async since the body has to be buffered, see [`RequestSignature`].
//!
//! ## Blocking API
//!
//! When the `blocking` feature is enabled (on by default), synchronous wrappers are provided via
//! [`RequestSignatureSync`]. These use `futures::executor::block_on` internally and are intended
//! **exclusively for non-async contexts**.
//!
//! # Panics
//!
//! Calling any `*_sync` method from within an async runtime (e.g. inside a `tokio::spawn` task)
//! will panic. If you are already in an async context, use the async methods directly.

mod error;
mod hyper_http;

pub use error::{HyperSigError, HyperSigResult};
#[cfg(feature = "blocking")]
pub use hyper_http::RequestSignatureSync;
pub use hyper_http::RequestSignature;
pub use reqsig::prelude;

/* ----------------------------------------------------------------- */
