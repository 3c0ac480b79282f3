use std::str::FromStr;
use tokio::time::Duration;

/// Parses a duration string such as "30s", "500ms", "2m" or "1h".
///
/// Supported units:
/// - `ms` for milliseconds
/// - `s` for seconds
/// - `m` for minutes
/// - `h` for hours
pub fn parse_duration_string(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Duration string cannot be empty".to_string());
    }

    let (value_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else {
        let split = s.len() - s.chars().last().map_or(0, char::len_utf8);
        (&s[..split], &s[split..])
    };

    let value = u64::from_str(value_str.trim())
        .map_err(|_| format!("Invalid numeric value in duration: '{}'", value_str))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60, s),
        "h" => scaled_secs(value, 60 * 60, s),
        other => Err(format!(
            "Unknown duration unit: '{}'. Use 'ms', 's', 'm' or 'h'.",
            other
        )),
    }
}

fn scaled_secs(value: u64, factor: u64, original: &str) -> Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("Duration value too large: '{}'", original))
}

/// Parses a comma-separated header string with support for escaped commas.
///
/// Use `\,` to include a literal comma in a header value.
/// Example: "X-Sim-Run:nightly,Accept-Language:en\,fr"
pub fn parse_headers_with_escapes(headers_str: &str) -> Vec<String> {
    let mut headers = Vec::new();
    let mut current_header = String::new();
    let mut chars = headers_str.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if chars.peek() == Some(&',') {
                    current_header.push(',');
                    chars.next();
                } else {
                    current_header.push('\\');
                }
            }
            ',' => {
                if !current_header.trim().is_empty() {
                    headers.push(current_header.clone());
                }
                current_header.clear();
            }
            _ => current_header.push(ch),
        }
    }

    if !current_header.trim().is_empty() {
        headers.push(current_header);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    mod duration {
        use super::*;

        #[test]
        fn parse_seconds() {
            assert_eq!(parse_duration_string("30s").unwrap(), Duration::from_secs(30));
        }

        #[test]
        fn parse_milliseconds() {
            assert_eq!(
                parse_duration_string("250ms").unwrap(),
                Duration::from_millis(250)
            );
        }

        #[test]
        fn parse_minutes_and_hours() {
            assert_eq!(parse_duration_string("2m").unwrap(), Duration::from_secs(120));
            assert_eq!(parse_duration_string("1h").unwrap(), Duration::from_secs(3600));
        }

        #[test]
        fn trims_whitespace() {
            assert_eq!(
                parse_duration_string("  10s  ").unwrap(),
                Duration::from_secs(10)
            );
        }

        #[test]
        fn empty_string_errors() {
            let err = parse_duration_string("").unwrap_err();
            assert!(err.contains("empty"), "error was: {}", err);
        }

        #[test]
        fn unknown_unit_errors() {
            let err = parse_duration_string("10x").unwrap_err();
            assert!(err.contains("Unknown duration unit"), "error was: {}", err);
        }

        #[test]
        fn oversized_values_error() {
            let err = parse_duration_string("99999999999999999h").unwrap_err();
            assert!(err.contains("too large"), "error was: {}", err);
            assert!(parse_duration_string("99999999999999999m").is_err());
            assert_eq!(
                parse_duration_string("99999999999999999s").unwrap(),
                Duration::from_secs(99_999_999_999_999_999)
            );
        }

        #[test]
        fn missing_number_errors() {
            assert!(parse_duration_string("s").is_err());
            assert!(parse_duration_string("abcs").is_err());
        }
    }

    mod headers {
        use super::*;

        #[test]
        fn single_header() {
            assert_eq!(
                parse_headers_with_escapes("X-Run:1"),
                vec!["X-Run:1".to_string()]
            );
        }

        #[test]
        fn multiple_headers() {
            assert_eq!(
                parse_headers_with_escapes("A:1,B:2"),
                vec!["A:1".to_string(), "B:2".to_string()]
            );
        }

        #[test]
        fn escaped_comma_kept_in_value() {
            assert_eq!(
                parse_headers_with_escapes(r"Accept-Language:en\,fr,X-Run:1"),
                vec!["Accept-Language:en,fr".to_string(), "X-Run:1".to_string()]
            );
        }

        #[test]
        fn blank_segments_skipped() {
            assert_eq!(
                parse_headers_with_escapes("A:1,, ,B:2,"),
                vec!["A:1".to_string(), "B:2".to_string()]
            );
        }

        #[test]
        fn lone_backslash_preserved() {
            assert_eq!(
                parse_headers_with_escapes(r"Path:C:\dir"),
                vec![r"Path:C:\dir".to_string()]
            );
        }
    }
}
