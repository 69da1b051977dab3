// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("Cannot retrieve original value for field `{field}`")]
    NoOriginal { field: SmolStr },
    #[error("`{0}` is not a mutator hook name (expected `_get<Field>` or `_set<Field>`)")]
    InvalidHook(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
