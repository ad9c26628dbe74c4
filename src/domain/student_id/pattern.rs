//! Template handling for student ID patterns.
//!
//! A pattern is split into literal text and tokens once; rendering and regex
//! construction both walk the same segment list so that every rendered ID is
//! matched by the regex built from the same config.

use super::config::{CaseFormat, StudentIdConfig, YearFormat};

pub const TOKEN_PREFIX: &str = "{PREFIX}";
pub const TOKEN_YEAR: &str = "{YEAR}";
pub const TOKEN_YEAR_SHORT: &str = "{YEAR_SHORT}";
pub const TOKEN_SEQUENCE: &str = "{SEQUENCE}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Prefix,
    Year,
    YearShort,
    Sequence,
}

const TOKENS: [(&str, Segment); 4] = [
    (TOKEN_YEAR_SHORT, Segment::YearShort),
    (TOKEN_PREFIX, Segment::Prefix),
    (TOKEN_YEAR, Segment::Year),
    (TOKEN_SEQUENCE, Segment::Sequence),
];

pub fn parse(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while !rest.is_empty() {
        let token = TOKENS
            .iter()
            .find(|(text, _)| rest.starts_with(text))
            .map(|(text, segment)| (text.len(), segment.clone()));

        match token {
            Some((len, segment)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
                rest = &rest[len..];
            }
            None => {
                let ch = rest.chars().next().unwrap_or_default();
                literal.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

pub fn full_year(year: i32) -> String {
    format!("{:04}", year)
}

pub fn short_year(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

/// Expands a two digit year into the current century.
pub fn expand_short_year(short: i32) -> i32 {
    2000 + short
}

fn token_value(
    segment: &Segment,
    config: &StudentIdConfig,
    year: i32,
    sequence: u32,
) -> Option<String> {
    match segment {
        Segment::Literal(_) => None,
        Segment::Prefix => Some(config.prefix.clone()),
        Segment::Year if config.include_year => Some(match config.year_format {
            YearFormat::Full => full_year(year),
            YearFormat::Short => short_year(year),
        }),
        Segment::YearShort if config.include_year => Some(short_year(year)),
        Segment::Year | Segment::YearShort => Some(String::new()),
        Segment::Sequence => Some(format!(
            "{:0width$}",
            sequence,
            width = config.sequence_length
        )),
    }
}

/// Substitutes tokens, inserts the separator between adjacent non-empty token
/// outputs and applies the configured case folding.
pub fn render(segments: &[Segment], config: &StudentIdConfig, year: i32, sequence: u32) -> String {
    let mut out = String::new();
    let mut after_token = false;

    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                out.push_str(text);
                after_token = false;
            }
            token => {
                let value = token_value(token, config, year, sequence).unwrap_or_default();
                if value.is_empty() {
                    continue;
                }
                if after_token {
                    out.push_str(&config.separator);
                }
                out.push_str(&value);
                after_token = true;
            }
        }
    }

    config.case_format.apply(&out)
}

/// Builds an anchored regex source matching every ID `render` can produce.
///
/// Named groups `prefix`, `year`, `year_short` and `sequence` capture the
/// first occurrence of each token.
pub fn regex_source(segments: &[Segment], config: &StudentIdConfig) -> String {
    let mut source = String::from("^");
    if config.case_format == CaseFormat::Mixed {
        source.insert_str(0, "(?i)");
    }

    let mut after_token = false;
    let mut seen: Vec<&'static str> = Vec::new();
    let mut group = |name: &'static str, body: String| -> String {
        if seen.contains(&name) {
            format!("(?:{body})")
        } else {
            seen.push(name);
            format!("(?P<{name}>{body})")
        }
    };

    for segment in segments {
        let fragment = match segment {
            Segment::Literal(text) => {
                source.push_str(&regex::escape(&config.case_format.apply(text)));
                after_token = false;
                continue;
            }
            Segment::Prefix if config.prefix.is_empty() => continue,
            Segment::Prefix => group(
                "prefix",
                regex::escape(&config.case_format.apply(&config.prefix)),
            ),
            Segment::Year | Segment::YearShort if !config.include_year => continue,
            Segment::Year => match config.year_format {
                YearFormat::Full => group("year", r"\d{4}".to_string()),
                YearFormat::Short => group("year", r"\d{2}".to_string()),
            },
            Segment::YearShort => group("year_short", r"\d{2}".to_string()),
            Segment::Sequence => group(
                "sequence",
                format!(r"\d{{{}}}", config.sequence_length),
            ),
        };

        if after_token {
            source.push_str(&regex::escape(&config.separator));
        }
        source.push_str(&fragment);
        after_token = true;
    }

    source.push('$');
    source
}
