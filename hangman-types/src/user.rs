use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub games_played: i32,
    pub wins: i32,
    pub created_at: String, // ISO 8601 string for simplicity
}

impl User {
    pub fn new(name: String, email: Option<String>, created_at: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            games_played: 0,
            wins: 0,
            created_at,
        }
    }

    /// Fraction of completed games this user has won.
    /// Computed on read so it can never go stale.
    pub fn winning_percentage(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.games_played)
        }
    }

    /// Applies a completed game to the user's lifetime stats.
    /// Cancellations never reach this point.
    pub fn record_completed_game(&mut self, won: bool) {
        self.games_played += 1;
        if won {
            self.wins += 1;
        }
    }
}
