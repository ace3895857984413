#[macro_use]
extern crate proptest;

use proptest::prelude::{Strategy, prop};

use papergist::segmenter::Segmenter;

/// Mixed prose-like text: words, spaces, newlines, sentence ends.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("([a-zA-Z0-9]{1,12}[ \n]|[a-zA-Z0-9]{1,12}\\. |\n\n){0,60}")
        .unwrap()
}

proptest! {
    #[test]
    fn prop_chunks_respect_the_budget(
        text in text_strategy(),
        max in 4usize..64,
        overlap in 0usize..8,
    ) {
        let segmenter = Segmenter::new(max, overlap);
        for chunk in segmenter.segment(&text) {
            prop_assert!(chunk.char_len() <= max,
                "chunk of {} chars exceeds budget {}", chunk.char_len(), max);
        }
    }

    #[test]
    fn prop_non_empty_input_yields_at_least_one_chunk(
        text in text_strategy(),
        max in 4usize..64,
    ) {
        prop_assume!(!text.is_empty());
        let segmenter = Segmenter::new(max, 0);
        prop_assert!(!segmenter.segment(&text).is_empty());
    }

    #[test]
    fn prop_segmentation_is_deterministic(
        text in text_strategy(),
        max in 4usize..64,
        overlap in 0usize..8,
    ) {
        let segmenter = Segmenter::new(max, overlap);
        prop_assert_eq!(segmenter.segment(&text), segmenter.segment(&text));
    }

    #[test]
    fn prop_zero_overlap_concatenation_reconstructs_input(
        text in text_strategy(),
        max in 4usize..64,
    ) {
        let segmenter = Segmenter::new(max, 0);
        let rebuilt: String = segmenter
            .segment(&text)
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        prop_assert_eq!(rebuilt, text);
    }

    #[test]
    fn prop_indices_are_dense_and_one_based(
        text in text_strategy(),
        max in 4usize..64,
        overlap in 0usize..8,
    ) {
        let segmenter = Segmenter::new(max, overlap);
        let chunks = segmenter.segment(&text);
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i + 1);
            prop_assert_eq!(chunk.total, total);
        }
    }
}
