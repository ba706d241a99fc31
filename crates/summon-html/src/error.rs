use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("composable body failed: {0}")]
    ComposeFailed(#[from] summon_core::ComposeError),
    #[error("nested <form> elements are not allowed")]
    NestedForm,
    #[error("hydration payload serialization failed: {0}")]
    HydrationSerialize(#[from] serde_json::Error),
}

impl From<summon_core::ScopeAbort> for RenderError {
    fn from(abort: summon_core::ScopeAbort) -> Self {
        match abort {
            summon_core::ScopeAbort::Panicked(message) => {
                RenderError::ComposeFailed(summon_core::ComposeError::BodyPanicked(message))
            }
        }
    }
}
