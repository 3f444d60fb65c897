use hangman_core::{Game, GuessOutcome};
use uuid::Uuid;

/// Creates a game with a specific secret word and attempt budget
pub fn create_game_with_word(word: &str, attempts: i32) -> Game {
    Game::new(Uuid::new_v4(), Uuid::new_v4(), word, attempts).expect("valid game parameters")
}

/// Creates a standard test game
pub fn create_standard_game() -> Game {
    create_game_with_word("hangman", 6)
}

/// Plays a sequence of guesses, returning the outcome of the last one
pub fn play_guesses(game: &mut Game, guesses: &[&str]) -> GuessOutcome {
    let mut last = None;
    for guess in guesses {
        last = Some(game.apply_guess(guess).expect("game still accepting guesses"));
    }
    last.expect("at least one guess")
}

/// Plays every distinct letter of the secret word, winning the game
pub fn play_to_win(game: &mut Game) -> GuessOutcome {
    let letters: Vec<String> = {
        let mut seen = String::new();
        game.secret_word
            .chars()
            .filter(|c| {
                let new = !seen.contains(*c);
                if new {
                    seen.push(*c);
                }
                new
            })
            .map(|c| c.to_string())
            .collect()
    };
    let guesses: Vec<&str> = letters.iter().map(String::as_str).collect();
    play_guesses(game, &guesses)
}
