// Property-based tests for OCR line assembly and timer extraction

use common::ocr::{assemble_lines, Token, TimerExtractor, LINE_TOLERANCE};
use proptest::prelude::*;

fn token_at(text: &str, x: f64, y: f64) -> Token {
    Token::from_rect(text, x, y, 20.0, 0.0)
}

fn arb_tokens() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(("[a-z]{1,6}", 0.0f64..800.0, 0.0f64..800.0), 0..40).prop_map(|raw| {
        raw.into_iter()
            .map(|(text, x, y)| token_at(&text, x, y))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Property: the same input always yields the same lines
    #[test]
    fn property_assembly_is_deterministic(tokens in arb_tokens()) {
        prop_assert_eq!(assemble_lines(&tokens), assemble_lines(&tokens));
    }

    // Property: every token lands in exactly one line
    #[test]
    fn property_tokens_are_preserved(tokens in arb_tokens()) {
        let lines = assemble_lines(&tokens);
        let total: usize = lines.iter().map(|l| l.tokens.len()).sum();
        prop_assert_eq!(total, tokens.len());
    }

    // Property: lines run top to bottom, tokens left to right, and every
    // token sits strictly within tolerance of its line key
    #[test]
    fn property_lines_are_ordered_and_tight(tokens in arb_tokens()) {
        let lines = assemble_lines(&tokens);
        for pair in lines.windows(2) {
            prop_assert!(pair[0].y <= pair[1].y);
        }
        for line in &lines {
            for pair in line.tokens.windows(2) {
                prop_assert!(pair[0].left_x() <= pair[1].left_x());
            }
            for token in &line.tokens {
                prop_assert!((token.center_y() - line.y).abs() < LINE_TOLERANCE);
            }
        }
    }

    // Property: rows far apart never merge
    #[test]
    fn property_separated_rows_stay_apart(rows in 1usize..15, gap in LINE_TOLERANCE..200.0) {
        let tokens: Vec<Token> = (0..rows)
            .flat_map(|row| {
                let y = row as f64 * gap;
                vec![token_at("name", 10.0, y), token_at("1h", 300.0, y + 2.0)]
            })
            .collect();

        let lines = assemble_lines(&tokens);
        prop_assert_eq!(lines.len(), rows);
        for line in &lines {
            prop_assert_eq!(line.text(), "name 1h");
        }
    }

    // Property: well-separated two-column rows produce one candidate each
    #[test]
    fn property_two_column_rows_extract(rows in 1usize..10, hours in 1u32..24) {
        let mut tokens = vec![token_at("summary", 0.0, 0.0)];
        for row in 0..rows {
            let y = 100.0 + row as f64 * 50.0;
            tokens.push(token_at(&format!("building{}", row), 10.0, y));
            tokens.push(token_at(&format!("{}h", hours), 400.0, y));
        }

        let candidates = TimerExtractor::default().candidates(&tokens);
        prop_assert_eq!(candidates.len(), rows);
        for (row, candidate) in candidates.iter().enumerate() {
            prop_assert_eq!(&candidate.name, &format!("building{}", row));
            prop_assert_eq!(&candidate.duration_text, &format!("{}h", hours));
        }
    }
}

#[test]
fn test_tolerance_boundary() {
    let same = assemble_lines(&[token_at("a", 0.0, 100.0), token_at("b", 50.0, 114.999)]);
    assert_eq!(same.len(), 1);

    let split = assemble_lines(&[token_at("a", 0.0, 100.0), token_at("b", 50.0, 115.0)]);
    assert_eq!(split.len(), 2);
}
