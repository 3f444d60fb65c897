use thiserror::Error;
use uuid::Uuid;

/// Violations of the game state machine's preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Illegal action: Game is already over.")]
    GameAlreadyOver,
    #[error("The word to guess must not be empty.")]
    EmptyWord,
    #[error("Attempts allowed must be at least 1, got {attempts}.")]
    InvalidAttempts { attempts: i32 },
}

/// Caller-facing error taxonomy for the API surface. These are caller-input
/// errors surfaced directly with no retry; transient failures end up in
/// `Internal`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("A User with that name already exists!")]
    UserAlreadyExists { name: String },
    #[error("A User with that name does not exist!")]
    UserNotFound { name: String },
    #[error("Game not found!")]
    GameNotFound { game_id: Uuid },
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}
