use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable record of one completed (non-cancelled) game.
/// Created exactly once, when the game transitions to won or lost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: String, // completion date, YYYY-MM-DD
    pub won: bool,
    pub guesses_made: i32,
    pub score_value: f64,
}

/// Outbound score representation, with the owning user resolved to a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreView {
    pub user_name: String,
    pub date: String,
    pub won: bool,
    pub guesses: i32,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntry {
    pub user_name: String,
    pub winning_percentage: f64,
    pub average_score: f64,
}
