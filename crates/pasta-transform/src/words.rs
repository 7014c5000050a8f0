//! Whole-word matching of column names inside rule text.
//!
//! An occurrence counts only when neither neighbour is a word character
//! (alphanumeric or `_`), so `name` never matches inside `first_name`.

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offsets of whole-word occurrences of `word` in `text`.
pub fn whole_word_matches<'a>(text: &'a str, word: &'a str) -> impl Iterator<Item = usize> + 'a {
    let matches = if word.is_empty() {
        None
    } else {
        Some(text.match_indices(word))
    };
    matches
        .into_iter()
        .flatten()
        .map(|(start, _)| start)
        .filter(move |&start| is_bounded(text, start, start + word.len()))
}

pub fn contains_whole_word(text: &str, word: &str) -> bool {
    whole_word_matches(text, word).next().is_some()
}

/// True when `text[start..end]` has no word character on either side.
pub(crate) fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}
