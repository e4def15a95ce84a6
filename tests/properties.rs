use htr_postprocess::text::{self, Document};
use proptest::prelude::*;

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("ab".to_string()),
        Just("ba".to_string()),
        Just("aa".to_string()),
        "[a-zſ]{1,6}",
    ]
}

/// Non-empty tokens joined by single spaces or newlines.
fn text_of_tokens() -> impl Strategy<Value = (Vec<String>, String)> {
    prop::collection::vec((token(), prop::bool::ANY), 1..20).prop_map(|parts| {
        let tokens: Vec<String> = parts.iter().map(|(t, _)| t.clone()).collect();
        let mut text = String::new();
        for (i, (token, newline)) in parts.iter().enumerate() {
            if i > 0 {
                text.push(if *newline { '\n' } else { ' ' });
            }
            text.push_str(token);
        }
        (tokens, text)
    })
}

proptest! {
    #[test]
    fn clean_is_idempotent(input in "[a-z.,:·¶/()\\[\\]'\" \n]{0,40}") {
        let deletions = [".", ",", ":", "·", "¶", "/", "(", ")", "[", "]", "'", "\""];
        let mut once = Document::new(input);
        once.clean(&deletions);
        let mut twice = once.clone();
        twice.clean(&deletions);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn unique_words_are_distinct_tokens_of_the_text((tokens, input) in text_of_tokens()) {
        let words = text::unique_words(&input);
        prop_assert!(words.len() <= tokens.len());
        for word in &words {
            prop_assert!(tokens.contains(word));
        }
        for token in &tokens {
            prop_assert!(words.contains(token));
        }
    }

    #[test]
    fn replace_word_never_touches_longer_tokens((tokens, input) in text_of_tokens()) {
        let (output, count) = text::replace_word(&input, "a", "X");
        let after: Vec<&str> = output.split([' ', '\n']).collect();

        prop_assert_eq!(after.len(), tokens.len());
        prop_assert!(count <= tokens.iter().filter(|t| *t == "a").count());
        for (before, after) in tokens.iter().zip(&after) {
            if before == "a" {
                prop_assert!(*after == "a" || *after == "X");
            } else {
                prop_assert_eq!(before.as_str(), *after);
            }
        }
    }
}
