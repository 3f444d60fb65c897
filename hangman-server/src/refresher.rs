use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::cache::{AttemptsCache, AVERAGE_ATTEMPTS_KEY};
use hangman_persistence::repositories::GameRepository;

/// Recomputes the average attempts remaining over all in-progress games and
/// stores a readable summary in the cache. With no in-progress games the
/// cache is left untouched.
pub async fn refresh_average_attempts(games: &GameRepository, cache: &AttemptsCache) -> Result<()> {
    let in_progress = games.find_in_progress().await?;
    if in_progress.is_empty() {
        return Ok(());
    }

    let total: i32 = in_progress.iter().map(|game| game.attempts_remaining).sum();
    let average = f64::from(total) / in_progress.len() as f64;

    cache.set(
        AVERAGE_ATTEMPTS_KEY,
        format!("The average moves remaining is {average:.2}"),
    );
    Ok(())
}

/// Fire-and-forget refresh, triggered after every game creation. Failures
/// are logged and never reach the request that triggered them.
pub fn spawn_refresh(games: Arc<GameRepository>, cache: Arc<AttemptsCache>) {
    tokio::spawn(async move {
        if let Err(err) = refresh_average_attempts(&games, &cache).await {
            warn!("Failed to refresh average attempts cache: {err:#}");
        }
    });
}
