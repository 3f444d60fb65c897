use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GameId = Uuid;
pub type UserId = Uuid;

/// Outbound representation of a game, paired with a contextual message
/// describing the result of the operation that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub id: GameId,
    pub user_name: String,
    pub attempts_remaining: i32,
    pub letters_tried: String,
    pub current_word: String,
    pub is_over: bool,
    pub is_cancelled: bool,
    pub guesses: Vec<String>,
    pub messages_history: Vec<String>,
    pub message: String,
}

/// One guess and the message it produced, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistoryEntry {
    pub guess: String,
    pub message: String,
}
