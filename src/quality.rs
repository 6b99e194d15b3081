//! Heuristic quality score for translated text.
//!
//! Advisory metadata only: the score drives the `needs_review` flag on a
//! result and never affects task success.

/// Score contributed by length alone never exceeds this.
const LENGTH_SCORE_CAP: usize = 90;
const BASE_SCORE: usize = 50;
/// Characters per extra point of length score.
const CHARS_PER_POINT: usize = 4;
const PUNCTUATION_BONUS: usize = 10;

/// Score a translated string in `0..=100`.
///
/// Empty text scores 0. Otherwise longer text scores higher up to
/// [`LENGTH_SCORE_CAP`], and text carrying any character that is neither
/// alphanumeric nor whitespace (punctuation, symbols) earns a flat bonus.
pub fn score(text: &str) -> u8 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0;
    }

    let mut score = (BASE_SCORE + chars / CHARS_PER_POINT).min(LENGTH_SCORE_CAP);
    if text
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        score += PUNCTUATION_BONUS;
    }

    score.min(100) as u8
}
