use thiserror::Error;

use crate::polyline::DecodeError;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("malformed step geometry: {0}")]
    Decode(#[from] DecodeError),
    /// The route has zero legs or zero steps. This is the only error that
    /// aborts a whole metrics computation; it is distinct from a zero-value
    /// result.
    #[error("route has no legs or steps to analyse")]
    InsufficientGeometry,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or non-2xx server response, after the one fallback
    /// retry where one applies.
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: &'static str, reason: String },
    /// 4xx from a provider. Never retried.
    #[error("{service} rejected the query (status {status})")]
    Rejected { service: &'static str, status: u16 },
}
