use anyhow::Result;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{games, games::StringList, prelude::*, scores, users};
use hangman_core::Game;
use hangman_types::{Score, User};

pub struct GameRepository {
    db: DatabaseConnection,
}

impl GameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_game(model: games::Model) -> Game {
        Game {
            id: model.id,
            user_id: model.user_id,
            secret_word: model.secret_word,
            remaining_letters: model.remaining_letters,
            revealed_pattern: model.revealed_pattern,
            attempts_allowed: model.attempts_allowed,
            attempts_remaining: model.attempts_remaining,
            letters_tried: model.letters_tried,
            is_over: model.is_over,
            is_cancelled: model.is_cancelled,
            guesses: model.guesses.0,
            messages_history: model.messages_history.0,
        }
    }

    fn update_model(game: &Game) -> games::ActiveModel {
        games::ActiveModel {
            id: ActiveValue::Unchanged(game.id),
            remaining_letters: ActiveValue::Set(game.remaining_letters.clone()),
            revealed_pattern: ActiveValue::Set(game.revealed_pattern.clone()),
            attempts_remaining: ActiveValue::Set(game.attempts_remaining),
            letters_tried: ActiveValue::Set(game.letters_tried.clone()),
            is_over: ActiveValue::Set(game.is_over),
            is_cancelled: ActiveValue::Set(game.is_cancelled),
            guesses: ActiveValue::Set(StringList(game.guesses.clone())),
            messages_history: ActiveValue::Set(StringList(game.messages_history.clone())),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
            ..Default::default()
        }
    }

    pub async fn create(&self, game: &Game) -> Result<()> {
        let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();
        let model = games::ActiveModel {
            id: ActiveValue::Set(game.id),
            user_id: ActiveValue::Set(game.user_id),
            secret_word: ActiveValue::Set(game.secret_word.clone()),
            remaining_letters: ActiveValue::Set(game.remaining_letters.clone()),
            revealed_pattern: ActiveValue::Set(game.revealed_pattern.clone()),
            attempts_allowed: ActiveValue::Set(game.attempts_allowed),
            attempts_remaining: ActiveValue::Set(game.attempts_remaining),
            letters_tried: ActiveValue::Set(game.letters_tried.clone()),
            is_over: ActiveValue::Set(game.is_over),
            is_cancelled: ActiveValue::Set(game.is_cancelled),
            guesses: ActiveValue::Set(StringList(game.guesses.clone())),
            messages_history: ActiveValue::Set(StringList(game.messages_history.clone())),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        Games::insert(model).exec(&self.db).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Game>> {
        let model = Games::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Self::model_to_game))
    }

    /// Writes back a mutated game that did not reach a terminal state.
    pub async fn update(&self, game: &Game) -> Result<()> {
        Games::update(Self::update_model(game)).exec(&self.db).await?;
        Ok(())
    }

    /// In-progress games for one user (not over, not cancelled).
    pub async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<Game>> {
        let models = Games::find()
            .filter(games::Column::UserId.eq(user_id))
            .filter(games::Column::IsOver.eq(false))
            .filter(games::Column::IsCancelled.eq(false))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_game).collect())
    }

    /// All in-progress games, used by the average-attempts refresher.
    pub async fn find_in_progress(&self) -> Result<Vec<Game>> {
        let models = Games::find()
            .filter(games::Column::IsOver.eq(false))
            .filter(games::Column::IsCancelled.eq(false))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_game).collect())
    }

    /// Persists a terminal transition as one atomic unit: the finished game,
    /// its score record, and the owner's updated stats. Either all three land
    /// or none do.
    pub async fn complete_game(&self, game: &Game, score: &Score, user: &User) -> Result<()> {
        let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();
        let date: chrono::NaiveDate = score.date.parse()?;

        let score_model = scores::ActiveModel {
            id: ActiveValue::Set(score.id),
            user_id: ActiveValue::Set(score.user_id),
            date: ActiveValue::Set(date),
            won: ActiveValue::Set(score.won),
            guesses_made: ActiveValue::Set(score.guesses_made),
            score_value: ActiveValue::Set(score.score_value),
            created_at: ActiveValue::Set(now),
        };

        let user_model = users::ActiveModel {
            id: ActiveValue::Unchanged(user.id),
            games_played: ActiveValue::Set(user.games_played),
            wins: ActiveValue::Set(user.wins),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };

        let txn = self.db.begin().await?;
        Games::update(Self::update_model(game)).exec(&txn).await?;
        Scores::insert(score_model).exec(&txn).await?;
        Users::update(user_model).exec(&txn).await?;
        txn.commit().await?;

        tracing::debug!("Persisted terminal game {} (won={})", game.id, score.won);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use crate::repositories::{ScoreRepository, UserRepository};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::DatabaseConnection;

    async fn setup_test_db() -> DatabaseConnection {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_user(db: &DatabaseConnection, name: &str) -> User {
        UserRepository::new(db.clone())
            .create_user(User::new(
                name.to_string(),
                None,
                chrono::Utc::now().to_rfc3339(),
            ))
            .await
            .unwrap()
    }

    fn new_game(user: &User, word: &str, attempts: i32) -> Game {
        Game::new(Uuid::new_v4(), user.id, word, attempts).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_game() {
        let db = setup_test_db().await;
        let repo = GameRepository::new(db.clone());
        let user = seed_user(&db, "alice").await;

        let game = new_game(&user, "cat", 3);
        repo.create(&game).await.unwrap();

        let found = repo.find_by_id(game.id).await.unwrap().unwrap();
        assert_eq!(found.secret_word, "cat");
        assert_eq!(found.revealed_pattern, "   ");
        assert_eq!(found.attempts_remaining, 3);
        assert!(found.guesses.is_empty());
    }

    #[tokio::test]
    async fn test_update_round_trips_guess_state() {
        let db = setup_test_db().await;
        let repo = GameRepository::new(db.clone());
        let user = seed_user(&db, "alice").await;

        let mut game = new_game(&user, "cat", 3);
        repo.create(&game).await.unwrap();

        game.apply_guess("c").unwrap();
        game.apply_guess("x").unwrap();
        repo.update(&game).await.unwrap();

        let found = repo.find_by_id(game.id).await.unwrap().unwrap();
        assert_eq!(found.revealed_pattern, "c  ");
        assert_eq!(found.letters_tried, "cx");
        assert_eq!(found.attempts_remaining, 2);
        assert_eq!(found.guesses, vec!["c", "x"]);
        assert_eq!(found.guesses.len(), found.messages_history.len());
    }

    #[tokio::test]
    async fn test_find_active_by_user_skips_finished_and_cancelled() {
        let db = setup_test_db().await;
        let repo = GameRepository::new(db.clone());
        let user = seed_user(&db, "alice").await;

        let active = new_game(&user, "cat", 3);
        repo.create(&active).await.unwrap();

        let mut cancelled = new_game(&user, "dog", 3);
        repo.create(&cancelled).await.unwrap();
        cancelled.cancel();
        repo.update(&cancelled).await.unwrap();

        let mut over = new_game(&user, "a", 1);
        repo.create(&over).await.unwrap();
        over.apply_guess("a").unwrap();
        repo.update(&over).await.unwrap();

        let games = repo.find_active_by_user(user.id).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, active.id);

        let in_progress = repo.find_in_progress().await.unwrap();
        assert_eq!(in_progress.len(), 1);
    }

    #[tokio::test]
    async fn test_complete_game_writes_all_three_entities() {
        let db = setup_test_db().await;
        let repo = GameRepository::new(db.clone());
        let users = UserRepository::new(db.clone());
        let scores = ScoreRepository::new(db.clone());
        let mut user = seed_user(&db, "alice").await;

        let mut game = new_game(&user, "cat", 3);
        repo.create(&game).await.unwrap();
        game.apply_guess("c").unwrap();
        game.apply_guess("a").unwrap();
        game.apply_guess("t").unwrap();
        assert!(game.is_over);

        user.record_completed_game(true);
        let score = Score {
            id: Uuid::new_v4(),
            user_id: user.id,
            date: "2026-08-24".to_string(),
            won: true,
            guesses_made: game.guesses_made(),
            score_value: 3.0,
        };

        repo.complete_game(&game, &score, &user).await.unwrap();

        let found_game = repo.find_by_id(game.id).await.unwrap().unwrap();
        assert!(found_game.is_over);

        let found_user = users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found_user.games_played, 1);
        assert_eq!(found_user.wins, 1);

        let user_scores = scores.find_by_user(user.id).await.unwrap();
        assert_eq!(user_scores.len(), 1);
        assert_eq!(user_scores[0].score_value, 3.0);
        assert_eq!(user_scores[0].date, "2026-08-24");
    }
}
