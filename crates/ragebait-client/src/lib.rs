//! Client for the Ragebait generation backend.
//!
//! The backend accepts a video plus a comedy lens, runs the (slow) roast
//! pipeline and serves the finished artifacts. This crate wraps its JSON
//! HTTP contract and exposes the [`RoastApi`] seam the job layer builds on.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::RoastApi;
pub use client::{RoastClient, RoastClientConfig};
pub use error::{ApiError, ApiResult};
pub use types::{
    CommentarySegment, GenerateOptions, GenerateResponse, HealthResponse, LensInfo, MemeRequest,
    MemeResult, ParodyRequest, ParodyResult, VideoInfo, VideoUpload,
};
