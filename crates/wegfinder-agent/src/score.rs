//! Parsing of free-text usefulness scores.

/// Result of reading a usefulness value out of an advisory answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedScore {
    /// A finite number inside `[-1, 1]`.
    Valid(f64),
    /// A finite number outside `[-1, 1]`, clamped into range.
    Clamped { raw: f64, value: f64 },
    /// No finite number found; treated as neutral.
    Unparseable,
}

impl ParsedScore {
    pub fn value(self) -> f64 {
        match self {
            ParsedScore::Valid(v) | ParsedScore::Clamped { value: v, .. } => v,
            ParsedScore::Unparseable => 0.0,
        }
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | '+' | '.')
}

/// Longest prefix of `token` that reads as a finite float, the way `"0.8/1"` gives 0.8.
fn leading_number(token: &str) -> Option<f64> {
    (1..=token.len())
        .rev()
        .filter(|&end| token.is_char_boundary(end))
        .find_map(|end| token[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn first_number(text: &str) -> Option<f64> {
    if let Ok(v) = text.trim().parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    text.split(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | ';' | '=' | '(' | ')'))
        .map(|token| token.trim_start_matches(|c: char| !is_number_char(c)))
        .filter(|token| token.chars().any(|c| c.is_ascii_digit()))
        .find_map(leading_number)
}

/// Reads the first numeric token of `text` as usefulness.
///
/// `"0.8"`, `" 0.8\n"`, `"Score: 0.8"` and `"0.8/1"` all give `0.8`. Only the
/// leading number of a token counts, so `"8/10"` reads as 8 and is clamped to 1.
pub fn parse_usefulness(text: &str) -> ParsedScore {
    match first_number(text) {
        Some(v) if (-1.0..=1.0).contains(&v) => ParsedScore::Valid(v),
        Some(v) => ParsedScore::Clamped {
            raw: v,
            value: v.clamp(-1.0, 1.0),
        },
        None => ParsedScore::Unparseable,
    }
}
