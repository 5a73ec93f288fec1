use crate::domain::ModuleId;
use thiserror::Error;

/// Precondition violations raised synchronously by the builders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("override requires at least one target module")]
    EmptyOverride,
    #[error("module {0} cannot be overridden")]
    ProtectedTarget(ModuleId),
}
