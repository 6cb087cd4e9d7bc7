//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`StageError`] covers:
//! - Animation control failures (unknown clip names)
//! - Asset loading and decoding errors
//! - Configuration parsing and validation errors
//!
//! None of these are fatal to the host scene. A failed load leaves the
//! stage inert, an unknown clip name leaves playback untouched.
//!
//! ```rust,ignore
//! use stagehand::errors::{StageError, Result};
//!
//! fn switch(director: &mut AnimationDirector) -> Result<()> {
//!     director.play("Wave", 0.5)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the stage.
#[derive(Error, Debug)]
pub enum StageError {
    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// A transition was requested to a clip the director does not know.
    #[error("Animation clip not found: {0}")]
    ClipNotFound(String),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// An operation needed the loaded model before the loader delivered it.
    #[error("Model has not been loaded yet")]
    ModelNotLoaded,

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    GltfError(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The configuration parsed but holds values that cannot work.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Async Errors
    // ========================================================================
    /// Task join error (when the blocking load task fails to complete).
    #[error("Task join error: {0}")]
    TaskJoinError(String),
}

#[cfg(feature = "gltf")]
impl From<gltf::Error> for StageError {
    fn from(err: gltf::Error) -> Self {
        StageError::GltfError(err.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<tokio::task::JoinError> for StageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StageError::TaskJoinError(err.to_string())
    }
}

/// Alias for `Result<T, StageError>`.
pub type Result<T> = std::result::Result<T, StageError>;
