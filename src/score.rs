//! Score formatting and lexical score packing
//!
//! Scores travel on the wire as ASCII. Redis accepts `+inf`/`-inf` as range
//! bounds, and integral scores are sent without a fractional suffix so that
//! `ZADD key 3 m` and integer-scored range bounds stay byte-identical to what
//! redis-cli would send.

use crate::error::{Result, ZedisError};

/// Largest magnitude at which every integral f64 is exactly representable
const MAX_INTEGRAL: f64 = 9_007_199_254_740_992.0; // 2^53

/// Format a score for the wire
pub fn format_score(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if score.fract() == 0.0 && score.abs() <= MAX_INTEGRAL {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

/// Format a score, rejecting NaN at the marshalling boundary
pub fn score_arg(score: f64) -> Result<String> {
    if score.is_nan() {
        return Err(ZedisError::InvalidArgument(
            "score must not be NaN".to_string(),
        ));
    }
    Ok(format_score(score))
}

/// Derive a numeric score from a string's first four bytes, packed big-endian.
///
/// `b0*256^3 + b1*256^2 + b2*256 + b3`; missing bytes contribute zero, so the
/// empty string scores 0. Within a score-ordered set this approximates
/// lexicographic ordering, but only the first four bytes participate: strings
/// sharing a 4-byte prefix collapse to the same score.
pub fn lexical_score(value: &str) -> f64 {
    let mut score = 0u64;
    for (i, byte) in value.bytes().take(4).enumerate() {
        score += (byte as u64) << (8 * (3 - i));
    }
    score as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_integral_scores() {
        assert_eq!(format_score(3.0), "3");
        assert_eq!(format_score(-17.0), "-17");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn test_format_fractional_scores() {
        assert_eq!(format_score(1.5), "1.5");
        assert_eq!(format_score(-0.25), "-0.25");
    }

    #[test]
    fn test_format_infinities() {
        assert_eq!(format_score(f64::INFINITY), "+inf");
        assert_eq!(format_score(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_score_arg_rejects_nan() {
        assert!(matches!(
            score_arg(f64::NAN),
            Err(ZedisError::InvalidArgument(_))
        ));
        assert_eq!(score_arg(2.0).unwrap(), "2");
    }

    #[test]
    fn test_lexical_score_packing() {
        assert_eq!(lexical_score(""), 0.0);
        assert_eq!(lexical_score("a"), 97.0 * 256.0 * 256.0 * 256.0);
        assert_eq!(
            lexical_score("ab"),
            97.0 * 16_777_216.0 + 98.0 * 65_536.0
        );
        assert_eq!(
            lexical_score("abcd"),
            97.0 * 16_777_216.0 + 98.0 * 65_536.0 + 99.0 * 256.0 + 100.0
        );
    }

    #[test]
    fn test_lexical_score_ignores_bytes_past_four() {
        assert_eq!(lexical_score("abcd"), lexical_score("abcdzzz"));
    }

    #[test]
    fn test_lexical_score_orders_prefixes() {
        assert!(lexical_score("apple") < lexical_score("banana"));
        assert!(lexical_score("aa") < lexical_score("ab"));
        assert!(lexical_score("a") < lexical_score("aa"));
    }
}
