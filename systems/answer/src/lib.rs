#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure answer evaluation that compares typed derivatives against the track slope.
//!
//! Parsing follows a deliberately narrow grammar: an optional leading minus,
//! decimal digits and at most one decimal point, with at least one digit.
//! Exponents, explicit plus signs, whitespace and the textual infinities that
//! `f64::from_str` would otherwise accept are all rejected.

use derivative_dash_core::DEFAULT_ANSWER_TOLERANCE;
use thiserror::Error;

/// Reasons typed text fails to parse as an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AnswerParseError {
    /// Nothing was typed.
    #[error("no answer was entered")]
    Empty,
    /// A character outside the numeric alphabet was found.
    #[error("unexpected character {character:?} at position {position}")]
    UnexpectedCharacter {
        /// Offending character.
        character: char,
        /// Zero-based character position.
        position: usize,
    },
    /// A minus sign appeared after the first position.
    #[error("minus sign at position {position} must lead the number")]
    MisplacedSign {
        /// Zero-based character position.
        position: usize,
    },
    /// More than one decimal point was typed.
    #[error("more than one decimal point")]
    MultipleDecimalPoints,
    /// Only a sign and/or a decimal point were typed.
    #[error("the answer contains no digits")]
    MissingDigits,
}

/// Result of comparing an answer with the true slope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verdict {
    /// The answer lies strictly within tolerance.
    Correct {
        /// Parsed answer.
        answer: f64,
        /// Absolute difference from the true slope.
        error: f64,
    },
    /// The answer parsed but lies outside tolerance.
    Incorrect {
        /// Parsed answer.
        answer: f64,
        /// Absolute difference from the true slope.
        error: f64,
    },
    /// The text is not a number.
    Unparsable(AnswerParseError),
}

/// Evaluator holding the tolerance used to judge answers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnswerEvaluator {
    tolerance: f64,
}

impl AnswerEvaluator {
    /// Creates an evaluator that accepts answers whose error is below `tolerance`.
    #[must_use]
    pub const fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Tolerance applied by this evaluator.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Judges `raw_text` against `true_slope`.
    #[must_use]
    pub fn evaluate(&self, raw_text: &str, true_slope: f64) -> Verdict {
        evaluate(raw_text, true_slope, self.tolerance)
    }
}

impl Default for AnswerEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_ANSWER_TOLERANCE)
    }
}

/// Judges `raw_text` against `true_slope`; the tolerance boundary is exclusive.
#[must_use]
pub fn evaluate(raw_text: &str, true_slope: f64, tolerance: f64) -> Verdict {
    let answer = match parse_answer(raw_text) {
        Ok(answer) => answer,
        Err(error) => return Verdict::Unparsable(error),
    };

    let error = (answer - true_slope).abs();
    if error < tolerance {
        Verdict::Correct { answer, error }
    } else {
        Verdict::Incorrect { answer, error }
    }
}

/// Parses typed text using the answer grammar.
pub fn parse_answer(raw_text: &str) -> Result<f64, AnswerParseError> {
    if raw_text.is_empty() {
        return Err(AnswerParseError::Empty);
    }

    let mut digits = 0_usize;
    let mut decimal_points = 0_usize;
    for (position, character) in raw_text.chars().enumerate() {
        match character {
            '0'..='9' => digits += 1,
            '.' => {
                decimal_points += 1;
                if decimal_points > 1 {
                    return Err(AnswerParseError::MultipleDecimalPoints);
                }
            }
            '-' if position == 0 => {}
            '-' => return Err(AnswerParseError::MisplacedSign { position }),
            _ => {
                return Err(AnswerParseError::UnexpectedCharacter {
                    character,
                    position,
                })
            }
        }
    }

    if digits == 0 {
        return Err(AnswerParseError::MissingDigits);
    }

    raw_text
        .parse::<f64>()
        .map_err(|_| AnswerParseError::MissingDigits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tolerance_boundary_is_exclusive() {
        assert!(matches!(
            evaluate("5.0", 5.49, 0.5),
            Verdict::Correct { .. }
        ));
        assert!(matches!(
            evaluate("5.0", 5.50, 0.5),
            Verdict::Incorrect { .. }
        ));
    }

    #[test]
    fn empty_and_alphabetic_text_is_unparsable() {
        assert_eq!(
            evaluate("", 1.0, 0.5),
            Verdict::Unparsable(AnswerParseError::Empty)
        );
        assert_eq!(
            evaluate("abc", 1.0, 0.5),
            Verdict::Unparsable(AnswerParseError::UnexpectedCharacter {
                character: 'a',
                position: 0
            })
        );
    }

    #[test]
    fn negative_answer_reports_error_magnitude() {
        match evaluate("-3.2", 0.0, 0.5) {
            Verdict::Incorrect { answer, error } => {
                assert!((answer + 3.2).abs() < 1e-12);
                assert!((error - 3.2).abs() < 1e-12);
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn grammar_accepts_leading_or_trailing_decimal_point() {
        assert_eq!(parse_answer("5."), Ok(5.0));
        assert_eq!(parse_answer(".5"), Ok(0.5));
        assert_eq!(parse_answer("-.25"), Ok(-0.25));
        assert_eq!(parse_answer("007"), Ok(7.0));
    }

    #[test]
    fn grammar_rejects_what_float_parsing_would_allow() {
        assert!(parse_answer("inf").is_err());
        assert!(parse_answer("NaN").is_err());
        assert!(parse_answer("1e3").is_err());
        assert!(parse_answer("+5").is_err());
        assert!(parse_answer(" 5").is_err());
    }

    #[test]
    fn grammar_reports_structural_errors() {
        assert_eq!(parse_answer("-"), Err(AnswerParseError::MissingDigits));
        assert_eq!(parse_answer("."), Err(AnswerParseError::MissingDigits));
        assert_eq!(parse_answer("-."), Err(AnswerParseError::MissingDigits));
        assert_eq!(
            parse_answer("1.2.3"),
            Err(AnswerParseError::MultipleDecimalPoints)
        );
        assert_eq!(
            parse_answer("3-1"),
            Err(AnswerParseError::MisplacedSign { position: 1 })
        );
        assert_eq!(
            parse_answer("--1"),
            Err(AnswerParseError::MisplacedSign { position: 1 })
        );
    }

    #[test]
    fn evaluator_uses_configured_tolerance() {
        let strict = AnswerEvaluator::new(0.01);
        assert!(matches!(
            strict.evaluate("1.0", 1.05),
            Verdict::Incorrect { .. }
        ));
        assert!(matches!(
            AnswerEvaluator::default().evaluate("1.0", 1.05),
            Verdict::Correct { .. }
        ));
        assert_eq!(AnswerEvaluator::default().tolerance(), 0.5);
    }

    proptest! {
        #[test]
        fn rounded_slopes_are_accepted(slope in -1_000.0f64..1_000.0) {
            let typed = format!("{slope:.2}");
            let accepted = matches!(evaluate(&typed, slope, 0.5), Verdict::Correct { .. });
            prop_assert!(accepted, "{} should be accepted", typed);
        }

        #[test]
        fn text_with_foreign_characters_is_unparsable(
            prefix in "[0-9]{0,4}",
            foreign in "[a-zA-Z+ eE,]",
            suffix in "[0-9]{0,4}",
        ) {
            let typed = format!("{prefix}{foreign}{suffix}");
            let unparsable = matches!(evaluate(&typed, 0.0, 0.5), Verdict::Unparsable(_));
            prop_assert!(unparsable);
        }
    }
}
