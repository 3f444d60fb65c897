//! Player-facing messages produced by the game state machine. These strings
//! are part of the API contract and are recorded verbatim in each game's
//! message history.

pub const MSG_GAME_CANCELLED: &str = "Game cancelled";
pub const MSG_MUST_BE_LETTER: &str = "Your guess must be a letter.";
pub const MSG_ONE_LETTER_ONLY: &str = "Your guess must be one letter only.";
pub const MSG_ALREADY_TRIED: &str = "This letter was already tried.";
pub const MSG_WIN: &str = "You win!";
pub const MSG_LETTER_IN_WORD: &str = "This letter is in the word. You can continue guessing.";
pub const MSG_LETTER_NOT_IN_WORD: &str = "This letter is not in the word to be guessed!";
pub const MSG_GAME_OVER_SUFFIX: &str = " Game over!";
pub const MSG_CANNOT_CANCEL: &str = "Game cannot be cancelled because it is already over.";
pub const MSG_CANCELLED_OK: &str = "Game successfully cancelled.";
