/// Return the whitespace-delimited word containing byte `index`, with
/// punctuation stripped (alphanumerics and underscore survive). Out-of-range
/// indices yield an empty string.
///
/// This backs the coarse time-proportional word estimate: the caller maps a
/// frame timestamp to a byte offset in the source text and asks which word
/// sits there. There is no forced alignment; the answer is an approximation.
pub fn word_at_byte_index(text: &str, index: usize) -> String {
    if index >= text.len() {
        return String::new();
    }
    let bytes = text.as_bytes();
    let start = bytes[..index]
        .iter()
        .rposition(|&b| b == b' ')
        .map_or(0, |pos| pos + 1);
    let end = bytes[index..]
        .iter()
        .position(|&b| b == b' ')
        .map_or(text.len(), |pos| index + pos);

    // Word boundaries land on ASCII spaces or the string ends, so the slice
    // is always on a char boundary.
    text[start..end]
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_word_in_the_middle() {
        assert_eq!(word_at_byte_index("the quick fox", 6), "quick");
    }

    #[test]
    fn finds_first_and_last_words() {
        assert_eq!(word_at_byte_index("the quick fox", 0), "the");
        assert_eq!(word_at_byte_index("the quick fox", 12), "fox");
    }

    #[test]
    fn index_on_a_space_yields_preceding_word() {
        assert_eq!(word_at_byte_index("the quick fox", 3), "the");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(word_at_byte_index("hello, world!", 1), "hello");
        assert_eq!(word_at_byte_index("hello, world!", 8), "world");
    }

    #[test]
    fn keeps_digits_and_underscores() {
        assert_eq!(word_at_byte_index("say foo_bar2! now", 6), "foo_bar2");
    }

    #[test]
    fn out_of_range_index_is_empty() {
        assert_eq!(word_at_byte_index("short", 5), "");
        assert_eq!(word_at_byte_index("short", 500), "");
    }

    #[test]
    fn empty_text_is_empty() {
        assert_eq!(word_at_byte_index("", 0), "");
    }
}
