use thiserror::Error;

/// Failures surfaced by [`crate::WorkoutSessionManager`].
///
/// Every fallible session operation returns one of these and also records it
/// as the session's current error, so UI code can render it without holding
/// on to the `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("no workout loaded")]
    NoSessionLoaded,
    #[error("no active workout session")]
    NoActiveSession,
    #[error("workout session already started")]
    AlreadyStarted,
    #[error("target set {0} is not part of the loaded workout")]
    UnknownTargetSet(i64),
    #[error("failed to start program: {0}")]
    ProgramStart(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl SessionError {
    pub fn persistence(e: anyhow::Error) -> Self {
        SessionError::Persistence(format!("{e:#}"))
    }
}

impl From<anyhow::Error> for SessionError {
    fn from(e: anyhow::Error) -> Self {
        SessionError::persistence(e)
    }
}
