/// Score awarded for a completed game:
/// `(attempts_remaining / attempts_allowed) * secret_word_length`.
///
/// Deterministic and non-negative. Maximal when no wrong guess was made.
/// A loss can only occur with `attempts_remaining == 0`, so loss scores are
/// always 0.0 — this is the intended contract, not a defect.
pub fn final_score(attempts_remaining: i32, attempts_allowed: i32, secret_word_length: usize) -> f64 {
    f64::from(attempts_remaining) / f64::from(attempts_allowed) * secret_word_length as f64
}
