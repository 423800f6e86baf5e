use thiserror::Error;

/// The user declined a confirmation the command cannot proceed without.
#[derive(Clone, Copy, Debug, Error)]
#[error("The process has been terminated by the user")]
pub struct UserTermination;
