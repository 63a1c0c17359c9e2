//! Error types surfaced to callers of the generator.
//!
//! Only configuration problems, an exhausted retry budget and an explicit
//! abort reach the caller. A socket or candidate that cannot be placed is
//! handled inside the engine by sealing the socket.

use dungen_logic::geometry::Vec3;
use thiserror::Error;

/// Unified result type for generation.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Fatal configuration problems. Never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("catalog has no room templates but {target} tiles were requested")]
    EmptyCatalog { target: u32 },
    #[error("catalog has no room templates to select from")]
    NoRoomTemplates,
    #[error("catalog has no root template")]
    MissingRootTemplate,
    #[error("room template `{name}` has invalid weight {weight}")]
    InvalidWeight { name: String, weight: f32 },
    #[error("every room template has zero weight")]
    ZeroWeights,
    #[error("template `{name}` has an empty or non-finite bounding box")]
    InvalidTemplateBounds { name: String },
    #[error("template `{name}` socket {index} has a non-finite pose")]
    InvalidSocket { name: String, index: usize },
    #[error("tile padding must be finite and non-negative, got {0}")]
    NegativePadding(f32),
    #[error("overlap tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f32),
    #[error("max_failed_attempts must be at least 1")]
    NoRetryBudget,
    #[error("bounds extent must be positive and finite, got {0:?}")]
    InvalidBounds(Vec3),
    #[error("connection chance curve for {owner}: {problem}")]
    InvalidCurve { owner: String, problem: &'static str },
    #[error("{0} kind list is empty")]
    EmptyKinds(&'static str),
    #[error("weighted selection found no template (draw {draw} of total {total})")]
    SelectionFellThrough { draw: f32, total: f32 },
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that end a call to the generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("no complete layout after {attempts} attempts")]
    RetryBudgetExceeded { attempts: u32 },
    #[error("generation aborted during attempt {attempt}")]
    Aborted { attempt: u32 },
}
