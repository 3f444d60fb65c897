use hangman_types::{GameError, GameId, UserId};
use serde::{Deserialize, Serialize};

use crate::messages::*;
use crate::scoring::final_score;

/// Derived game state. `InProgress` is the only state that accepts guesses;
/// the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
    Cancelled,
}

/// Result of a single guess transition.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    /// The guess was rejected before being recorded (cancelled game,
    /// malformed input, or repeated letter). Logs are untouched.
    NotRecorded(String),
    /// The guess was recorded and the game continues.
    Continuing(String),
    /// The guess was recorded and ended the game. The caller must create the
    /// Score record and update the user's stats in the same transaction as
    /// the game write.
    Completed {
        won: bool,
        message: String,
        score_value: f64,
    },
}

impl GuessOutcome {
    pub fn message(&self) -> &str {
        match self {
            GuessOutcome::NotRecorded(message) => message,
            GuessOutcome::Continuing(message) => message,
            GuessOutcome::Completed { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The game was in progress and is now cancelled.
    Cancelled(String),
    /// Finished games cannot be cancelled; nothing changed.
    AlreadyOver(String),
}

impl CancelOutcome {
    pub fn message(&self) -> &str {
        match self {
            CancelOutcome::Cancelled(message) => message,
            CancelOutcome::AlreadyOver(message) => message,
        }
    }
}

/// A single hangman game owned by one user.
///
/// Invariants maintained across every transition:
/// - `revealed_pattern` has the same character length as `secret_word`
/// - `remaining_letters` is the secret word's multiset minus every tried
///   letter that occurs in it
/// - `guesses.len() == messages_history.len()`
/// - once `is_over` or `is_cancelled` is set, no guess mutates anything
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub user_id: UserId,
    pub secret_word: String,
    pub remaining_letters: String,
    pub revealed_pattern: String,
    pub attempts_allowed: i32,
    pub attempts_remaining: i32,
    pub letters_tried: String,
    pub is_over: bool,
    pub is_cancelled: bool,
    pub guesses: Vec<String>,
    pub messages_history: Vec<String>,
}

impl Game {
    /// Starts a new game. The secret word is normalized to lowercase before
    /// storage so guess matching is case-insensitive.
    pub fn new(
        id: GameId,
        user_id: UserId,
        secret_word: &str,
        attempts_allowed: i32,
    ) -> Result<Self, GameError> {
        if secret_word.is_empty() {
            return Err(GameError::EmptyWord);
        }
        if attempts_allowed < 1 {
            return Err(GameError::InvalidAttempts {
                attempts: attempts_allowed,
            });
        }

        let secret_word = secret_word.to_lowercase();
        let revealed_pattern = " ".repeat(secret_word.chars().count());

        Ok(Self {
            id,
            user_id,
            remaining_letters: secret_word.clone(),
            secret_word,
            revealed_pattern,
            attempts_allowed,
            attempts_remaining: attempts_allowed,
            letters_tried: String::new(),
            is_over: false,
            is_cancelled: false,
            guesses: Vec::new(),
            messages_history: Vec::new(),
        })
    }

    pub fn status(&self) -> GameStatus {
        if self.is_cancelled {
            GameStatus::Cancelled
        } else if self.is_over {
            if self.remaining_letters.is_empty() {
                GameStatus::Won
            } else {
                GameStatus::Lost
            }
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_in_progress(&self) -> bool {
        !self.is_over && !self.is_cancelled
    }

    /// Number of distinct letters tried so far; the `guesses_made` figure
    /// recorded on the Score at completion.
    pub fn guesses_made(&self) -> i32 {
        self.letters_tried.chars().count() as i32
    }

    /// Processes one letter guess. Checks run in a fixed order and the first
    /// failing one decides the outcome:
    ///
    /// 1. finished game -> `Err(GameAlreadyOver)`
    /// 2. cancelled game -> not recorded
    /// 3. not exactly one alphabetic character -> not recorded
    /// 4. letter already tried -> not recorded
    /// 5. otherwise the guess is recorded and the board advances, possibly
    ///    ending the game
    pub fn apply_guess(&mut self, guess: &str) -> Result<GuessOutcome, GameError> {
        if self.is_over {
            return Err(GameError::GameAlreadyOver);
        }
        if self.is_cancelled {
            return Ok(GuessOutcome::NotRecorded(MSG_GAME_CANCELLED.to_string()));
        }

        let guess = guess.to_lowercase();
        if !guess.chars().all(char::is_alphabetic) || guess.is_empty() {
            return Ok(GuessOutcome::NotRecorded(MSG_MUST_BE_LETTER.to_string()));
        }
        let mut chars = guess.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(letter), None) => letter,
            _ => return Ok(GuessOutcome::NotRecorded(MSG_ONE_LETTER_ONLY.to_string())),
        };
        if self.letters_tried.contains(letter) {
            return Ok(GuessOutcome::NotRecorded(MSG_ALREADY_TRIED.to_string()));
        }

        // Register the guess. From here on, exactly one message is appended
        // so the two logs stay in lockstep.
        self.letters_tried.push(letter);
        self.guesses.push(letter.to_string());

        if self.secret_word.contains(letter) {
            self.reveal(letter);
            self.remaining_letters.retain(|c| c != letter);

            if self.remaining_letters.is_empty() {
                let message = MSG_WIN.to_string();
                self.messages_history.push(message.clone());
                self.is_over = true;
                return Ok(GuessOutcome::Completed {
                    won: true,
                    message,
                    score_value: self.completion_score(),
                });
            }

            let message = MSG_LETTER_IN_WORD.to_string();
            self.messages_history.push(message.clone());
            return Ok(GuessOutcome::Continuing(message));
        }

        // An attempt is only deducted for a wrong guess
        self.attempts_remaining -= 1;

        if self.attempts_remaining < 1 {
            let message = format!("{MSG_LETTER_NOT_IN_WORD}{MSG_GAME_OVER_SUFFIX}");
            self.messages_history.push(message.clone());
            self.is_over = true;
            return Ok(GuessOutcome::Completed {
                won: false,
                message,
                score_value: self.completion_score(),
            });
        }

        let message = MSG_LETTER_NOT_IN_WORD.to_string();
        self.messages_history.push(message.clone());
        Ok(GuessOutcome::Continuing(message))
    }

    /// Cancels the game. Finished games cannot be cancelled. Cancellation
    /// touches neither the user's stats nor the score board.
    pub fn cancel(&mut self) -> CancelOutcome {
        if self.is_over {
            CancelOutcome::AlreadyOver(MSG_CANNOT_CANCEL.to_string())
        } else {
            self.is_cancelled = true;
            CancelOutcome::Cancelled(MSG_CANCELLED_OK.to_string())
        }
    }

    fn reveal(&mut self, letter: char) {
        self.revealed_pattern = self
            .secret_word
            .chars()
            .zip(self.revealed_pattern.chars())
            .map(|(secret, shown)| if secret == letter { secret } else { shown })
            .collect();
    }

    fn completion_score(&self) -> f64 {
        final_score(
            self.attempts_remaining,
            self.attempts_allowed,
            self.secret_word.chars().count(),
        )
    }
}
