use super::error::StudentIdError;
use super::pattern::{self, Segment};
use serde::{Deserialize, Serialize};

pub const MAX_SEQUENCE_LENGTH: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum YearFormat {
    #[default]
    Full,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseFormat {
    #[default]
    Upper,
    Lower,
    Mixed,
}

impl CaseFormat {
    pub fn apply(&self, value: &str) -> String {
        match self {
            CaseFormat::Upper => value.to_uppercase(),
            CaseFormat::Lower => value.to_lowercase(),
            CaseFormat::Mixed => value.to_string(),
        }
    }
}

/// Shape of generated student IDs.
///
/// `pattern` is a template over the tokens `{PREFIX}`, `{YEAR}`, `{YEAR_SHORT}`
/// and `{SEQUENCE}`; any other text is copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentIdConfig {
    pub prefix: String,
    #[serde(default)]
    pub year_format: YearFormat,
    pub sequence_length: usize,
    #[serde(default = "default_starting_number")]
    pub starting_number: u32,
    #[serde(default)]
    pub separator: String,
    #[serde(default = "default_include_year")]
    pub include_year: bool,
    pub pattern: String,
    #[serde(default)]
    pub case_format: CaseFormat,
}

fn default_starting_number() -> u32 {
    1
}

fn default_include_year() -> bool {
    true
}

impl Default for StudentIdConfig {
    fn default() -> Self {
        Self {
            prefix: "STU".to_string(),
            year_format: YearFormat::Full,
            sequence_length: 3,
            starting_number: 1,
            separator: String::new(),
            include_year: true,
            pattern: "{PREFIX}{YEAR}{SEQUENCE}".to_string(),
            case_format: CaseFormat::Upper,
        }
    }
}

impl StudentIdConfig {
    /// Largest sequence that fits in `sequence_length` digits.
    pub fn max_sequence(&self) -> u32 {
        let digits = self.sequence_length.clamp(1, MAX_SEQUENCE_LENGTH) as u32;
        10u32.pow(digits) - 1
    }

    pub fn validate(&self) -> Result<(), StudentIdError> {
        if self.sequence_length == 0 || self.sequence_length > MAX_SEQUENCE_LENGTH {
            return Err(StudentIdError::InvalidConfig(format!(
                "sequence_length must be between 1 and {MAX_SEQUENCE_LENGTH}"
            )));
        }
        if !self.prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StudentIdError::InvalidConfig(
                "prefix must contain only ASCII letters and digits".to_string(),
            ));
        }
        if self.separator.chars().any(|c| c.is_alphanumeric()) {
            return Err(StudentIdError::InvalidConfig(
                "separator must not contain letters or digits".to_string(),
            ));
        }
        let segments = pattern::parse(&self.pattern);
        if !segments.iter().any(|s| matches!(s, Segment::Sequence)) {
            return Err(StudentIdError::InvalidConfig(
                "pattern must contain the {SEQUENCE} token".to_string(),
            ));
        }
        if self.starting_number > self.max_sequence() {
            return Err(StudentIdError::InvalidConfig(format!(
                "starting_number {} does not fit in {} digits",
                self.starting_number, self.sequence_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(StudentIdConfig::default().validate().is_ok());
    }

    #[test]
    fn max_sequence_follows_length() {
        let config = StudentIdConfig {
            sequence_length: 4,
            ..StudentIdConfig::default()
        };
        assert_eq!(config.max_sequence(), 9999);
    }

    #[test]
    fn rejects_pattern_without_sequence() {
        let config = StudentIdConfig {
            pattern: "{PREFIX}-{YEAR}".to_string(),
            ..StudentIdConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StudentIdError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_alphanumeric_separator() {
        let config = StudentIdConfig {
            separator: "x".to_string(),
            ..StudentIdConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_starting_number_wider_than_sequence() {
        let config = StudentIdConfig {
            sequence_length: 2,
            starting_number: 100,
            ..StudentIdConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: StudentIdConfig = serde_json::from_str(
            r#"{"prefix":"ADM","sequence_length":4,"pattern":"{PREFIX}{SEQUENCE}"}"#,
        )
        .unwrap();
        assert_eq!(config.starting_number, 1);
        assert!(config.include_year);
        assert_eq!(config.case_format, CaseFormat::Upper);
        assert_eq!(config.year_format, YearFormat::Full);
    }
}
