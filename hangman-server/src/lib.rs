use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Filter;

use crate::service::GameService;
use hangman_types::{ApiError, GameError};

pub mod cache;
pub mod config;
pub mod refresher;
pub mod service;

#[derive(Deserialize)]
struct CreateUserRequest {
    user_name: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct NewGameRequest {
    user_name: String,
    word_to_guess: String,
    attempts: Option<i32>,
}

#[derive(Deserialize)]
struct MakeGuessRequest {
    guess: String,
}

#[derive(Deserialize)]
struct HighScoresQuery {
    limit: Option<u64>,
}

pub fn create_routes(
    service: Arc<GameService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let service_filter = warp::any().map({
        let service = service.clone();
        move || service.clone()
    });

    let health = warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let create_user = warp::path!("user")
        .and(warp::post())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_create_user);

    let new_game = warp::path!("game")
        .and(warp::post())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_new_game);

    let get_game = warp::path!("game" / Uuid)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_get_game);

    let cancel_game = warp::path!("game" / "cancel" / Uuid)
        .and(warp::put())
        .and(service_filter.clone())
        .and_then(handle_cancel_game);

    let make_guess = warp::path!("game" / Uuid / "guess")
        .and(warp::put())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_make_guess);

    let game_history = warp::path!("game" / Uuid / "history")
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_game_history);

    let scores = warp::path!("scores")
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_scores);

    let high_scores = warp::path!("scores" / "high")
        .and(warp::get())
        .and(warp::query::<HighScoresQuery>())
        .and(service_filter.clone())
        .and_then(handle_high_scores);

    let user_scores = warp::path!("scores" / "user" / String)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_user_scores);

    let average_attempts = warp::path!("games" / "average_attempts")
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_average_attempts);

    let user_games = warp::path!("games" / "user" / String)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_user_games);

    let rankings = warp::path!("rankings")
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_rankings);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    health
        .or(create_user)
        .or(new_game)
        .or(cancel_game)
        .or(make_guess)
        .or(game_history)
        .or(get_game)
        .or(high_scores)
        .or(user_scores)
        .or(scores)
        .or(average_attempts)
        .or(user_games)
        .or(rankings)
        .with(cors)
        .with(warp::log("hangman_server"))
}

fn error_reply(err: ApiError) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = match &err {
        ApiError::UserAlreadyExists { .. } => StatusCode::CONFLICT,
        ApiError::UserNotFound { .. } | ApiError::GameNotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::Game(GameError::GameAlreadyOver) => StatusCode::FORBIDDEN,
        ApiError::Game(_) => StatusCode::BAD_REQUEST,
        ApiError::Internal(source) => {
            tracing::error!("Internal error handling request: {source:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": err.to_string() })),
        status,
    )
}

fn reply_result<T: serde::Serialize>(
    result: Result<T, ApiError>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    match result {
        Ok(value) => warp::reply::with_status(warp::reply::json(&value), StatusCode::OK),
        Err(err) => error_reply(err),
    }
}

async fn handle_create_user(
    body: CreateUserRequest,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(
        service.create_user(&body.user_name, body.email).await,
    ))
}

async fn handle_new_game(
    body: NewGameRequest,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(
        service
            .start_game(&body.user_name, &body.word_to_guess, body.attempts)
            .await,
    ))
}

async fn handle_get_game(
    game_id: Uuid,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.get_game(game_id).await))
}

async fn handle_cancel_game(
    game_id: Uuid,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.cancel_game(game_id).await))
}

async fn handle_make_guess(
    game_id: Uuid,
    body: MakeGuessRequest,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.make_guess(game_id, &body.guess).await))
}

async fn handle_game_history(
    game_id: Uuid,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.game_history(game_id).await))
}

async fn handle_scores(service: Arc<GameService>) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.list_scores().await))
}

async fn handle_high_scores(
    query: HighScoresQuery,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.list_high_scores(query.limit).await))
}

async fn handle_user_scores(
    user_name: String,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.list_user_scores(&user_name).await))
}

async fn handle_average_attempts(
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(Ok(service.average_attempts_remaining().await)))
}

async fn handle_user_games(
    user_name: String,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.list_user_games(&user_name).await))
}

async fn handle_rankings(service: Arc<GameService>) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(reply_result(service.rankings().await))
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::cache::AttemptsCache;
    use crate::refresher;
    use hangman_persistence::connection::connect_to_memory_database;
    use hangman_persistence::repositories::{GameRepository, ScoreRepository, UserRepository};
    use hangman_types::GameView;
    use migration::{Migrator, MigratorTrait};
    use warp::filters::BoxedFilter;
    use warp::reply::Response;
    use warp::Reply;

    type TestApp = BoxedFilter<(Response,)>;

    fn box_app<F, R>(filter: F) -> TestApp
    where
        F: Filter<Extract = (R,), Error = warp::Rejection> + Clone + Send + Sync + 'static,
        R: Reply + Send + 'static,
    {
        filter.map(|reply: R| reply.into_response()).boxed()
    }

    struct TestContext {
        app: TestApp,
        games: Arc<GameRepository>,
        cache: Arc<AttemptsCache>,
    }

    async fn create_test_context() -> TestContext {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let games = Arc::new(GameRepository::new(db.clone()));
        let cache = Arc::new(AttemptsCache::new());
        let service = Arc::new(GameService::new(
            Arc::new(UserRepository::new(db.clone())),
            games.clone(),
            Arc::new(ScoreRepository::new(db)),
            cache.clone(),
            6,
        ));
        let app = box_app(create_routes(service));

        TestContext { app, games, cache }
    }

    async fn create_user(app: &TestApp, name: &str) {
        let response = warp::test::request()
            .method("POST")
            .path("/user")
            .json(&serde_json::json!({ "user_name": name }))
            .reply(app)
            .await;
        assert_eq!(response.status(), 200);
    }

    async fn start_game(app: &TestApp, name: &str, word: &str, attempts: i32) -> GameView {
        let response = warp::test::request()
            .method("POST")
            .path("/game")
            .json(&serde_json::json!({
                "user_name": name,
                "word_to_guess": word,
                "attempts": attempts,
            }))
            .reply(app)
            .await;
        assert_eq!(response.status(), 200);
        serde_json::from_slice(response.body()).expect("Should parse GameView")
    }

    async fn guess(app: &TestApp, game_id: Uuid, letter: &str) -> GameView {
        let response = warp::test::request()
            .method("PUT")
            .path(&format!("/game/{game_id}/guess"))
            .json(&serde_json::json!({ "guess": letter }))
            .reply(app)
            .await;
        assert_eq!(response.status(), 200);
        serde_json::from_slice(response.body()).expect("Should parse GameView")
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "OK");
    }

    #[tokio::test]
    async fn test_create_user_and_duplicate_conflict() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();

        let response = warp::test::request()
            .method("POST")
            .path("/user")
            .json(&serde_json::json!({ "user_name": "alice", "email": "a@example.com" }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["message"], "User alice created!");

        let duplicate = warp::test::request()
            .method("POST")
            .path("/user")
            .json(&serde_json::json!({ "user_name": "alice" }))
            .reply(&app)
            .await;
        assert_eq!(duplicate.status(), 409);
        let error: serde_json::Value = serde_json::from_slice(duplicate.body()).unwrap();
        assert_eq!(error["error"], "A User with that name already exists!");
    }

    #[tokio::test]
    async fn test_new_game_requires_existing_user() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();

        let response = warp::test::request()
            .method("POST")
            .path("/game")
            .json(&serde_json::json!({ "user_name": "ghost", "word_to_guess": "cat" }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
        let error: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(error["error"], "A User with that name does not exist!");
    }

    #[tokio::test]
    async fn test_full_game_to_win_updates_scores_and_rankings() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();
        create_user(&app, "alice").await;

        let game = start_game(&app, "alice", "cat", 3).await;
        assert_eq!(game.message, "Try to guess the word!");
        assert_eq!(game.current_word, "   ");
        assert_eq!(game.attempts_remaining, 3);

        let view = guess(&app, game.id, "c").await;
        assert_eq!(view.current_word, "c  ");
        assert_eq!(
            view.message,
            "This letter is in the word. You can continue guessing."
        );

        let view = guess(&app, game.id, "x").await;
        assert_eq!(view.attempts_remaining, 2);
        assert_eq!(view.message, "This letter is not in the word to be guessed!");

        guess(&app, game.id, "a").await;
        let view = guess(&app, game.id, "t").await;
        assert_eq!(view.message, "You win!");
        assert!(view.is_over);
        assert_eq!(view.current_word, "cat");

        // Score recorded: (2 remaining / 3 allowed) * 3 letters
        let response = warp::test::request()
            .method("GET")
            .path("/scores")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let scores: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(scores.as_array().unwrap().len(), 1);
        assert_eq!(scores[0]["user_name"], "alice");
        assert_eq!(scores[0]["won"], true);
        assert_eq!(scores[0]["guesses"], 4);
        assert_eq!(scores[0]["score"], 2.0);

        // User stats reflected in the rankings
        let response = warp::test::request()
            .method("GET")
            .path("/rankings")
            .reply(&app)
            .await;
        let rankings: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(rankings[0]["user_name"], "alice");
        assert_eq!(rankings[0]["winning_percentage"], 1.0);
        assert_eq!(rankings[0]["average_score"], 2.0);

        // Further guesses are forbidden
        let response = warp::test::request()
            .method("PUT")
            .path(&format!("/game/{}/guess", game.id))
            .json(&serde_json::json!({ "guess": "z" }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 403);
        let error: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(error["error"], "Illegal action: Game is already over.");

        // Finished games cannot be cancelled
        let response = warp::test::request()
            .method("PUT")
            .path(&format!("/game/cancel/{}", game.id))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let view: GameView = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            view.message,
            "Game cannot be cancelled because it is already over."
        );
        assert!(!view.is_cancelled);

        // Contextual message on plain reads
        let response = warp::test::request()
            .method("GET")
            .path(&format!("/game/{}", game.id))
            .reply(&app)
            .await;
        let view: GameView = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view.message, "This game is over. Check stats about it");
    }

    #[tokio::test]
    async fn test_losing_game_records_zero_score() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();
        create_user(&app, "bob").await;

        let game = start_game(&app, "bob", "cat", 2).await;
        guess(&app, game.id, "x").await;
        let view = guess(&app, game.id, "y").await;

        assert_eq!(
            view.message,
            "This letter is not in the word to be guessed! Game over!"
        );
        assert!(view.is_over);

        let response = warp::test::request()
            .method("GET")
            .path("/scores/user/bob")
            .reply(&app)
            .await;
        let scores: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(scores[0]["won"], false);
        assert_eq!(scores[0]["score"], 0.0);
    }

    #[tokio::test]
    async fn test_cancelled_game_rejects_guesses_and_leaves_no_score() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();
        create_user(&app, "alice").await;

        let game = start_game(&app, "alice", "dog", 6).await;

        let response = warp::test::request()
            .method("PUT")
            .path(&format!("/game/cancel/{}", game.id))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let view: GameView = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view.message, "Game successfully cancelled.");
        assert!(view.is_cancelled);

        // Guesses against the cancelled game are answered but never recorded
        let view = guess(&app, game.id, "d").await;
        assert_eq!(view.message, "Game cancelled");
        assert!(view.guesses.is_empty());

        // Cancelled games leave no score and vanish from the active listing
        let response = warp::test::request()
            .method("GET")
            .path("/scores")
            .reply(&app)
            .await;
        let scores: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert!(scores.as_array().unwrap().is_empty());

        let response = warp::test::request()
            .method("GET")
            .path("/games/user/alice")
            .reply(&app)
            .await;
        let games: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert!(games.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_and_malformed_guesses_are_not_logged() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();
        create_user(&app, "alice").await;

        let game = start_game(&app, "alice", "cat", 6).await;
        guess(&app, game.id, "c").await;

        let view = guess(&app, game.id, "c").await;
        assert_eq!(view.message, "This letter was already tried.");
        assert_eq!(view.letters_tried, "c");

        let view = guess(&app, game.id, "3").await;
        assert_eq!(view.message, "Your guess must be a letter.");

        let view = guess(&app, game.id, "ab").await;
        assert_eq!(view.message, "Your guess must be one letter only.");

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/game/{}/history", game.id))
            .reply(&app)
            .await;
        let history: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let entries = history.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["guess"], "c");
        assert_eq!(
            entries[0]["message"],
            "This letter is in the word. You can continue guessing."
        );
    }

    #[tokio::test]
    async fn test_high_scores_ordering_and_limit() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();
        create_user(&app, "alice").await;

        // "banana" won cleanly scores 6.0; "ox" won cleanly scores 2.0
        let g1 = start_game(&app, "alice", "banana", 6).await;
        for letter in ["b", "a", "n"] {
            guess(&app, g1.id, letter).await;
        }

        let g2 = start_game(&app, "alice", "ox", 6).await;
        for letter in ["o", "x"] {
            guess(&app, g2.id, letter).await;
        }

        let response = warp::test::request()
            .method("GET")
            .path("/scores/high?limit=1")
            .reply(&app)
            .await;
        let scores: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let entries = scores.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["score"], 6.0);
    }

    #[tokio::test]
    async fn test_rankings_tie_breaks_by_average_score_ascending() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();
        create_user(&app, "alice").await;
        create_user(&app, "bob").await;

        // Both users win one game; alice's average score is higher
        let g1 = start_game(&app, "alice", "banana", 6).await;
        for letter in ["b", "a", "n"] {
            guess(&app, g1.id, letter).await;
        }

        let g2 = start_game(&app, "bob", "ox", 6).await;
        for letter in ["o", "x"] {
            guess(&app, g2.id, letter).await;
        }

        let response = warp::test::request()
            .method("GET")
            .path("/rankings")
            .reply(&app)
            .await;
        let rankings: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(rankings[0]["user_name"], "bob");
        assert_eq!(rankings[1]["user_name"], "alice");
    }

    #[tokio::test]
    async fn test_average_attempts_cache_lifecycle() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();

        // Never computed: empty string, not an error
        let response = warp::test::request()
            .method("GET")
            .path("/games/average_attempts")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["message"], "");

        create_user(&app, "alice").await;
        let game = start_game(&app, "alice", "cat", 4).await;
        guess(&app, game.id, "z").await;

        refresher::refresh_average_attempts(&ctx.games, &ctx.cache)
            .await
            .unwrap();

        let response = warp::test::request()
            .method("GET")
            .path("/games/average_attempts")
            .reply(&app)
            .await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["message"], "The average moves remaining is 3.00");
    }

    #[tokio::test]
    async fn test_refresher_leaves_cache_untouched_without_games() {
        let ctx = create_test_context().await;

        refresher::refresh_average_attempts(&ctx.games, &ctx.cache)
            .await
            .unwrap();
        assert_eq!(ctx.cache.get(cache::AVERAGE_ATTEMPTS_KEY), None);
    }

    #[tokio::test]
    async fn test_unknown_game_and_user_return_not_found() {
        let ctx = create_test_context().await;
        let app = ctx.app.clone();

        let missing = Uuid::new_v4();
        for path in [
            format!("/game/{missing}"),
            format!("/game/{missing}/history"),
            "/scores/user/ghost".to_string(),
            "/games/user/ghost".to_string(),
        ] {
            let response = warp::test::request()
                .method("GET")
                .path(&path)
                .reply(&app)
                .await;
            assert_eq!(response.status(), 404, "expected 404 for {path}");
        }

        let response = warp::test::request()
            .method("PUT")
            .path(&format!("/game/cancel/{missing}"))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 404);
    }
}
