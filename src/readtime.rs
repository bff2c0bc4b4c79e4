//! The reading-time estimate shown on post pages.

use crate::post::ContentBlock;

/// Assumed reading speed, in words per minute.
const WORDS_PER_MINUTE: u64 = 200;

/// Estimates the reading time for a post's content in whole minutes: the
/// total word count across block headings and body segments, divided by
/// [`WORDS_PER_MINUTE`], rounded up. Content with no words estimates to
/// zero minutes; there is deliberately no floor of one.
pub fn estimate(content: &[ContentBlock]) -> u64 {
    (word_count(content) + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE
}

/// Counts the whitespace-delimited words in a sequence of content
/// blocks, headings included.
pub fn word_count(content: &[ContentBlock]) -> u64 {
    content
        .iter()
        .map(|block| {
            words(&block.heading)
                + block.body.iter().map(|segment| words(&segment.text)).sum::<u64>()
        })
        .sum()
}

fn words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::Segment;

    fn block(heading: &str, body_words: usize) -> ContentBlock {
        ContentBlock {
            heading: heading.to_owned(),
            body: vec![Segment {
                text: vec!["palavra"; body_words].join(" "),
            }],
        }
    }

    #[test]
    fn test_estimate_empty_content() {
        assert_eq!(0, estimate(&[]));
    }

    #[test]
    fn test_estimate_exact_multiple() {
        assert_eq!(1, estimate(&[block("", 200)]));
    }

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(2, estimate(&[block("", 201)]));
    }

    #[test]
    fn test_headings_count_toward_total() {
        assert_eq!(200, word_count(&[block("duas palavras", 198)]));
    }

    #[test]
    fn test_word_count_additive_over_concatenation() {
        let a = vec![block("primeira", 37)];
        let b = vec![block("segunda parte", 91), block("", 5)];
        let both: Vec<ContentBlock> =
            a.iter().chain(b.iter()).cloned().collect();
        assert_eq!(word_count(&a) + word_count(&b), word_count(&both));
    }

    #[test]
    fn test_words_are_whitespace_delimited() {
        let block = ContentBlock {
            heading: "  spaced   out ".to_owned(),
            body: vec![Segment {
                text: "um\ndois\ttres".to_owned(),
            }],
        };
        assert_eq!(5, word_count(&[block]));
    }
}
