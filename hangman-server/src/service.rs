use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{AttemptsCache, AVERAGE_ATTEMPTS_KEY};
use crate::refresher;
use hangman_core::{build_rankings, CancelOutcome, Game, GameStatus, GuessOutcome};
use hangman_persistence::repositories::{GameRepository, ScoreRepository, UserRepository};
use hangman_types::{
    ApiError, GameHistoryEntry, GameId, GameView, RankingEntry, Score, ScoreView, StringMessage,
    User,
};

/// Orchestrates one request at a time: load entities, run the state machine,
/// write the mutation back, format the result.
pub struct GameService {
    users: Arc<UserRepository>,
    games: Arc<GameRepository>,
    scores: Arc<ScoreRepository>,
    cache: Arc<AttemptsCache>,
    default_attempts_allowed: i32,
}

impl GameService {
    pub fn new(
        users: Arc<UserRepository>,
        games: Arc<GameRepository>,
        scores: Arc<ScoreRepository>,
        cache: Arc<AttemptsCache>,
        default_attempts_allowed: i32,
    ) -> Self {
        Self {
            users,
            games,
            scores,
            cache,
            default_attempts_allowed,
        }
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: Option<String>,
    ) -> Result<StringMessage, ApiError> {
        if self.users.find_by_name(name).await?.is_some() {
            return Err(ApiError::UserAlreadyExists {
                name: name.to_string(),
            });
        }

        let user = User::new(name.to_string(), email, chrono::Utc::now().to_rfc3339());
        self.users.create_user(user).await?;

        Ok(StringMessage::new(format!("User {name} created!")))
    }

    pub async fn start_game(
        &self,
        user_name: &str,
        word_to_guess: &str,
        attempts_allowed: Option<i32>,
    ) -> Result<GameView, ApiError> {
        let user = self.find_user(user_name).await?;
        let attempts = attempts_allowed.unwrap_or(self.default_attempts_allowed);
        let game = Game::new(Uuid::new_v4(), user.id, word_to_guess, attempts)?;
        self.games.create(&game).await?;

        // The cache refresh is not needed to complete game creation, so it
        // runs out of sequence and its failures stay out of this response.
        refresher::spawn_refresh(self.games.clone(), self.cache.clone());

        Ok(game_view(&game, &user.name, "Try to guess the word!"))
    }

    pub async fn get_game(&self, game_id: GameId) -> Result<GameView, ApiError> {
        let game = self.find_game(game_id).await?;
        let user_name = self.owner_name(&game).await?;

        let message = match game.status() {
            GameStatus::Won | GameStatus::Lost => "This game is over. Check stats about it",
            GameStatus::Cancelled => "Game cancelled. Check stats about it",
            GameStatus::InProgress => "One more attempt to guess!",
        };

        Ok(game_view(&game, &user_name, message))
    }

    pub async fn cancel_game(&self, game_id: GameId) -> Result<GameView, ApiError> {
        let mut game = self.find_game(game_id).await?;
        let user_name = self.owner_name(&game).await?;

        let outcome = game.cancel();
        if let CancelOutcome::Cancelled(_) = &outcome {
            self.games.update(&game).await?;
        }

        Ok(game_view(&game, &user_name, outcome.message()))
    }

    pub async fn make_guess(&self, game_id: GameId, guess: &str) -> Result<GameView, ApiError> {
        let mut game = self.find_game(game_id).await?;
        let mut user = self
            .users
            .find_by_id(game.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Game {} references missing user", game.id))?;

        let outcome = game.apply_guess(guess)?;
        match &outcome {
            GuessOutcome::NotRecorded(_) => {}
            GuessOutcome::Continuing(_) => self.games.update(&game).await?,
            GuessOutcome::Completed {
                won, score_value, ..
            } => {
                let score = Score {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    date: chrono::Utc::now().date_naive().to_string(),
                    won: *won,
                    guesses_made: game.guesses_made(),
                    score_value: *score_value,
                };
                user.record_completed_game(*won);
                self.games.complete_game(&game, &score, &user).await?;
            }
        }

        Ok(game_view(&game, &user.name, outcome.message()))
    }

    pub async fn list_scores(&self) -> Result<Vec<ScoreView>, ApiError> {
        let scores = self.scores.find_all().await?;
        self.score_views(scores).await
    }

    pub async fn list_high_scores(&self, limit: Option<u64>) -> Result<Vec<ScoreView>, ApiError> {
        let scores = self.scores.find_high_scores(limit).await?;
        self.score_views(scores).await
    }

    pub async fn list_user_scores(&self, user_name: &str) -> Result<Vec<ScoreView>, ApiError> {
        let user = self.find_user(user_name).await?;
        let scores = self.scores.find_by_user(user.id).await?;

        Ok(scores
            .into_iter()
            .map(|score| score_view(score, user.name.clone()))
            .collect())
    }

    pub async fn average_attempts_remaining(&self) -> StringMessage {
        StringMessage::new(self.cache.get(AVERAGE_ATTEMPTS_KEY).unwrap_or_default())
    }

    pub async fn list_user_games(&self, user_name: &str) -> Result<Vec<GameView>, ApiError> {
        let user = self.find_user(user_name).await?;
        let games = self.games.find_active_by_user(user.id).await?;
        let message = format!("Returning game for user:{}", user.name);

        Ok(games
            .iter()
            .map(|game| game_view(game, &user.name, &message))
            .collect())
    }

    pub async fn rankings(&self) -> Result<Vec<RankingEntry>, ApiError> {
        let users = self.users.find_all().await?;
        let mut users_with_scores = Vec::with_capacity(users.len());
        for user in users {
            let scores = self.scores.find_by_user(user.id).await?;
            users_with_scores.push((user, scores));
        }

        Ok(build_rankings(&users_with_scores))
    }

    pub async fn game_history(&self, game_id: GameId) -> Result<Vec<GameHistoryEntry>, ApiError> {
        let game = self.find_game(game_id).await?;

        Ok(game
            .guesses
            .iter()
            .zip(game.messages_history.iter())
            .map(|(guess, message)| GameHistoryEntry {
                guess: guess.clone(),
                message: message.clone(),
            })
            .collect())
    }

    async fn find_user(&self, name: &str) -> Result<User, ApiError> {
        self.users
            .find_by_name(name)
            .await?
            .ok_or_else(|| ApiError::UserNotFound {
                name: name.to_string(),
            })
    }

    async fn find_game(&self, game_id: GameId) -> Result<Game, ApiError> {
        self.games
            .find_by_id(game_id)
            .await?
            .ok_or(ApiError::GameNotFound { game_id })
    }

    async fn owner_name(&self, game: &Game) -> Result<String, ApiError> {
        let user = self
            .users
            .find_by_id(game.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Game {} references missing user", game.id))?;
        Ok(user.name)
    }

    async fn score_views(&self, scores: Vec<Score>) -> Result<Vec<ScoreView>, ApiError> {
        let names: HashMap<Uuid, String> = self
            .users
            .find_all()
            .await?
            .into_iter()
            .map(|user| (user.id, user.name))
            .collect();

        Ok(scores
            .into_iter()
            .map(|score| {
                let user_name = names.get(&score.user_id).cloned().unwrap_or_default();
                score_view(score, user_name)
            })
            .collect())
    }
}

fn game_view(game: &Game, user_name: &str, message: &str) -> GameView {
    GameView {
        id: game.id,
        user_name: user_name.to_string(),
        attempts_remaining: game.attempts_remaining,
        letters_tried: game.letters_tried.clone(),
        current_word: game.revealed_pattern.clone(),
        is_over: game.is_over,
        is_cancelled: game.is_cancelled,
        guesses: game.guesses.clone(),
        messages_history: game.messages_history.clone(),
        message: message.to_string(),
    }
}

fn score_view(score: Score, user_name: String) -> ScoreView {
    ScoreView {
        user_name,
        date: score.date,
        won: score.won,
        guesses: score.guesses_made,
        score: score.score_value,
    }
}
