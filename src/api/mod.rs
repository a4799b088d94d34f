//! Backend seam.
//!
//! [`Backend`] is everything the dashboard needs from the health-program
//! API. [`http::HttpBackend`] is the real implementation; tests substitute
//! in-memory stubs.

pub mod http;
pub mod ollama;

use thiserror::Error;

use crate::model::{GenerationResult, HealthMetrics, MemberProfile, StatsPatch, TimelineEvent};

/// Why a backend call produced no usable payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Decode(String),
}

/// Names used for each call in the load log.
pub mod source {
    pub const MEMBER: &str = "member";
    pub const STATS: &str = "stats";
    pub const HEALTH_METRICS: &str = "health_metrics";
    pub const TIMELINE: &str = "timeline";
    pub const GENERATION: &str = "generation";
}

/// The health-program REST API, as seen by the dashboard.
pub trait Backend {
    /// `GET /api/member/{id}`
    fn member(&self, id: u32) -> Result<MemberProfile, FetchError>;

    /// `GET /api/stats`
    fn stats(&self) -> Result<StatsPatch, FetchError>;

    /// `GET /api/health-metrics`
    fn health_metrics(&self) -> Result<HealthMetrics, FetchError>;

    /// `GET /api/timeline`, oldest first.
    fn timeline(&self) -> Result<Vec<TimelineEvent>, FetchError>;

    /// `POST /api/generate-conversations`
    ///
    /// An application-level refusal is `Ok(GenerationResult::Failed)`; only
    /// transport and decode problems are `Err`.
    fn generate_conversations(&self) -> Result<GenerationResult, FetchError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn member(&self, id: u32) -> Result<MemberProfile, FetchError> {
        (**self).member(id)
    }

    fn stats(&self) -> Result<StatsPatch, FetchError> {
        (**self).stats()
    }

    fn health_metrics(&self) -> Result<HealthMetrics, FetchError> {
        (**self).health_metrics()
    }

    fn timeline(&self) -> Result<Vec<TimelineEvent>, FetchError> {
        (**self).timeline()
    }

    fn generate_conversations(&self) -> Result<GenerationResult, FetchError> {
        (**self).generate_conversations()
    }
}
