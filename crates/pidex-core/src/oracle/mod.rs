//! Remote field extraction.
//!
//! An oracle reads the document text and answers with one record per invoice
//! item. It may be slow, unavailable or wrong; callers fall back to the
//! rule-based extractor on any [`OracleError`].

pub mod decode;
mod http;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub use http::ChatCompletionOracle;

use crate::error::OracleError;
use crate::models::record::ExtractionRecord;

/// Future returned by [`FieldOracle::extract`].
pub type OracleFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<ExtractionRecord>, OracleError>> + Send + 'a>>;

/// A service that extracts invoice records from document text.
pub trait FieldOracle: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Extract one record per invoice item.
    fn extract<'a>(&'a self, text: &'a str) -> OracleFuture<'a>;
}

/// An opaque credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from an environment variable; blank values count as unset.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(Self)
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
