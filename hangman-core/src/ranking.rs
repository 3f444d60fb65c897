use hangman_types::{RankingEntry, Score, User};

/// Mean score value over a user's score records, 0.0 with no records.
pub fn average_score(scores: &[Score]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().map(|s| s.score_value).sum::<f64>() / scores.len() as f64
    }
}

/// Builds the ranking board from each user and their score history.
///
/// Primary order is winning percentage descending. Ties break by average
/// score ascending; the ascending direction is a quirk of the original
/// ranking rules and is kept as-is.
pub fn build_rankings(users_with_scores: &[(User, Vec<Score>)]) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = users_with_scores
        .iter()
        .map(|(user, scores)| RankingEntry {
            user_name: user.name.clone(),
            winning_percentage: user.winning_percentage(),
            average_score: average_score(scores),
        })
        .collect();
    sort_rankings(&mut entries);
    entries
}

pub fn sort_rankings(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| {
        b.winning_percentage
            .total_cmp(&a.winning_percentage)
            .then(a.average_score.total_cmp(&b.average_score))
    });
}
