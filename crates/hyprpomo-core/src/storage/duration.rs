use std::time::Duration;

/// Parse a duration token.
///
/// Grammar: a bare integer is minutes; otherwise `<int>` followed by one
/// of `s`, `m`, `h` (case-insensitive). Anything else is `None`.
///
/// ```
/// use hyprpomo_core::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("25"), Some(Duration::from_secs(25 * 60)));
/// assert_eq!(parse_duration("90s"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("deep work"), None);
/// ```
pub fn parse_duration(token: &str) -> Option<Duration> {
    let token = token.trim().to_ascii_lowercase();
    if token.is_empty() {
        return None;
    }

    let (digits, unit_secs) = match token.char_indices().last()? {
        (i, 's') => (&token[..i], 1),
        (i, 'm') => (&token[..i], 60),
        (i, 'h') => (&token[..i], 3600),
        _ => (token.as_str(), 60),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let value: u64 = digits.parse().ok()?;
    value.checked_mul(unit_secs).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bare_integers_are_minutes() {
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45 * 60)));
        assert_eq!(parse_duration("0"), Some(Duration::ZERO));
    }

    #[test]
    fn unit_suffixes() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("15M"), Some(Duration::from_secs(900)));
    }

    #[test]
    fn rejects_everything_else() {
        for token in ["", "m", "abc", "5x", "-5", "5 m", "1.5h", "m5", "ssh"] {
            assert_eq!(parse_duration(token), None, "token {token:?}");
        }
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(parse_duration("99999999999999999999h"), None);
        assert_eq!(parse_duration(&format!("{}h", u64::MAX)), None);
    }

    proptest! {
        #[test]
        fn minutes_round_trip(n in 0u64..100_000) {
            prop_assert_eq!(parse_duration(&n.to_string()), Some(Duration::from_secs(n * 60)));
            prop_assert_eq!(parse_duration(&format!("{n}s")), Some(Duration::from_secs(n)));
        }

        #[test]
        fn never_panics(s in "\\PC*") {
            let _ = parse_duration(&s);
        }
    }
}
