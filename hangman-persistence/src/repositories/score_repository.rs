use anyhow::Result;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entities::{prelude::*, scores};
use hangman_types::Score;

pub struct ScoreRepository {
    db: DatabaseConnection,
}

impl ScoreRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_score(model: scores::Model) -> Score {
        Score {
            id: model.id,
            user_id: model.user_id,
            date: model.date.to_string(),
            won: model.won,
            guesses_made: model.guesses_made,
            score_value: model.score_value,
        }
    }

    pub async fn create(&self, score: &Score) -> Result<()> {
        let date: chrono::NaiveDate = score.date.parse()?;
        let model = scores::ActiveModel {
            id: ActiveValue::Set(score.id),
            user_id: ActiveValue::Set(score.user_id),
            date: ActiveValue::Set(date),
            won: ActiveValue::Set(score.won),
            guesses_made: ActiveValue::Set(score.guesses_made),
            score_value: ActiveValue::Set(score.score_value),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        Scores::insert(model).exec(&self.db).await?;
        Ok(())
    }

    pub async fn find_all(&self) -> Result<Vec<Score>> {
        let models = Scores::find().all(&self.db).await?;
        Ok(models.into_iter().map(Self::model_to_score).collect())
    }

    /// Scores ordered by score value descending, optionally capped.
    pub async fn find_high_scores(&self, limit: Option<u64>) -> Result<Vec<Score>> {
        let mut query = Scores::find().order_by_desc(scores::Column::ScoreValue);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Self::model_to_score).collect())
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Score>> {
        let models = Scores::find()
            .filter(scores::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_score).collect())
    }
}
