//! Unified error handling for the tracking pipeline.
//!
//! Only session startup is allowed to fail toward the caller; everything in
//! the fix-processing path absorbs its own problems (see the `session`
//! module). The variants here therefore cover trail resolution, lifecycle
//! misuse and breadcrumb persistence.

use thiserror::Error;

/// Errors produced by the tracking pipeline.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The requested trail does not exist in the trail source.
    #[error("trail '{trail_id}' not found")]
    TrailNotFound { trail_id: String },

    /// `start` was called while a session was already tracking a trail.
    #[error("session is already tracking trail '{trail_id}'")]
    SessionActive { trail_id: String },

    /// A breadcrumb write was rejected by the store. Reported by store
    /// implementations; the session logs it and moves on.
    #[error("breadcrumb write failed: {reason}")]
    BreadcrumbWrite { reason: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Extension trait for converting `Option` lookups into tracking errors.
pub trait OptionExt<T> {
    /// Convert `None` into [`TrackingError::TrailNotFound`].
    fn ok_or_trail_not_found(self, trail_id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_trail_not_found(self, trail_id: &str) -> Result<T> {
        self.ok_or_else(|| TrackingError::TrailNotFound {
            trail_id: trail_id.to_string(),
        })
    }
}
