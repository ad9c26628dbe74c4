use super::config::{CaseFormat, StudentIdConfig, YearFormat};
use super::error::StudentIdError;
use super::pattern::{self, Segment};
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedId {
    pub id: String,
    pub sequence: u32,
    /// Uniqueness against the known set when the id was computed. Nothing is
    /// locked, so callers persisting the id must still handle a collision.
    pub is_unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdComponents {
    pub prefix: Option<String>,
    pub year: Option<i32>,
    pub sequence: u32,
}

/// Allocates student IDs for one config and one set of known IDs.
///
/// The known set is compared case-insensitively. A generator is not meant to
/// be shared between concurrent allocators without external coordination.
#[derive(Debug, Clone)]
pub struct StudentIdGenerator {
    config: StudentIdConfig,
    year: i32,
    segments: Vec<Segment>,
    matcher: Regex,
    expected_len: usize,
    existing: HashSet<String>,
}

fn id_key(id: &str) -> String {
    id.trim().to_uppercase()
}

impl StudentIdGenerator {
    pub fn new<I, S>(config: StudentIdConfig, year: i32, existing: I) -> Result<Self, StudentIdError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        config.validate()?;
        let segments = pattern::parse(&config.pattern);
        let matcher = Regex::new(&pattern::regex_source(&segments, &config))
            .map_err(|err| StudentIdError::InvalidConfig(err.to_string()))?;
        let expected_len = pattern::render(&segments, &config, year, 0).chars().count();
        let existing = existing
            .into_iter()
            .map(|id| id_key(id.as_ref()))
            .collect();

        Ok(Self {
            config,
            year,
            segments,
            matcher,
            expected_len,
            existing,
        })
    }

    pub fn for_current_year<I, S>(config: StudentIdConfig, existing: I) -> Result<Self, StudentIdError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(config, chrono::Utc::now().year(), existing)
    }

    pub fn config(&self) -> &StudentIdConfig {
        &self.config
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn contains(&self, id: &str) -> bool {
        self.existing.contains(&id_key(id))
    }

    pub fn mark_used(&mut self, id: &str) {
        self.existing.insert(id_key(id));
    }

    pub fn known_count(&self) -> usize {
        self.existing.len()
    }

    /// Renders the id for `sequence` without looking at the known set.
    pub fn build_id(&self, sequence: u32) -> Result<String, StudentIdError> {
        self.build_id_for_year(sequence, self.year)
    }

    pub(crate) fn build_id_for_year(&self, sequence: u32, year: i32) -> Result<String, StudentIdError> {
        let max = self.config.max_sequence();
        if sequence > max {
            return Err(StudentIdError::SequenceOverflow {
                sequence: u64::from(sequence),
                max,
            });
        }
        Ok(pattern::render(&self.segments, &self.config, year, sequence))
    }

    /// With a sequence, renders that id and reports whether it is free. Without
    /// one, scans upward from `starting_number` to the first free id.
    pub fn generate_id(&self, sequence: Option<u32>) -> Result<GeneratedId, StudentIdError> {
        match sequence {
            Some(sequence) => {
                let id = self.build_id(sequence)?;
                let is_unique = !self.contains(&id);
                Ok(GeneratedId {
                    id,
                    sequence,
                    is_unique,
                })
            }
            None => next_free(self, &self.existing, self.config.starting_number),
        }
    }

    /// Generates `count` distinct ids, reserving each in the known set. Nothing
    /// is reserved when the batch cannot be completed.
    pub fn generate_batch(
        &mut self,
        count: usize,
        start_sequence: Option<u32>,
    ) -> Result<Vec<GeneratedId>, StudentIdError> {
        let mut reserved = self.existing.clone();
        let batch = run_batch(self, &mut reserved, count, start_sequence)?;
        self.existing = reserved;
        Ok(batch)
    }

    /// The next `count` ids `generate_batch` would hand out, without reserving.
    pub fn preview(&self, count: usize) -> Result<Vec<String>, StudentIdError> {
        let mut scratch = self.existing.clone();
        Ok(run_batch(self, &mut scratch, count, None)?
            .into_iter()
            .map(|generated| generated.id)
            .collect())
    }

    /// Checks `id` against every rule and reports each one that fails.
    pub fn validate_id(&self, id: &str) -> IdValidation {
        let mut errors = Vec::new();

        if id.trim().is_empty() {
            errors.push("Student ID cannot be empty".to_string());
            return IdValidation {
                is_valid: false,
                errors,
            };
        }
        if id.trim() != id {
            errors.push("Student ID must not have leading or trailing whitespace".to_string());
        }

        if let Some(message) = self.prefix_violation(id) {
            errors.push(message);
        }

        let length = id.chars().count();
        if length != self.expected_len {
            errors.push(format!(
                "Student ID must be {} characters long (found {})",
                self.expected_len, length
            ));
        }

        if !self.matcher.is_match(id) {
            errors.push(format!(
                "Student ID does not match the pattern {}",
                self.config.pattern
            ));
        }

        if self.contains(id) {
            errors.push(format!("Student ID {} already exists", id));
        }

        IdValidation {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    fn prefix_violation(&self, id: &str) -> Option<String> {
        if self.config.prefix.is_empty()
            || !self.segments.iter().any(|s| matches!(s, Segment::Prefix))
        {
            return None;
        }

        let expected = self.config.case_format.apply(&self.config.prefix);
        let (candidate, expected_cmp) = match self.config.case_format {
            CaseFormat::Mixed => (id.to_uppercase(), expected.to_uppercase()),
            _ => (id.to_string(), expected.clone()),
        };

        if matches!(self.segments.first(), Some(Segment::Prefix)) {
            (!candidate.starts_with(&expected_cmp))
                .then(|| format!("Student ID must start with {}", expected))
        } else {
            (!candidate.contains(&expected_cmp))
                .then(|| format!("Student ID must contain {}", expected))
        }
    }

    /// Splits an id produced under this config back into its components.
    pub fn parse_components(&self, id: &str) -> Option<IdComponents> {
        let caps = self.matcher.captures(id)?;
        let sequence = caps.name("sequence")?.as_str().parse::<u32>().ok()?;
        let prefix = caps.name("prefix").map(|m| m.as_str().to_string());

        let year = match (caps.name("year"), caps.name("year_short")) {
            (Some(year), _) => {
                let value = year.as_str().parse::<i32>().ok()?;
                Some(match self.config.year_format {
                    YearFormat::Full => value,
                    YearFormat::Short => pattern::expand_short_year(value),
                })
            }
            (None, Some(short)) => Some(pattern::expand_short_year(
                short.as_str().parse::<i32>().ok()?,
            )),
            (None, None) => None,
        };

        Some(IdComponents {
            prefix,
            year,
            sequence,
        })
    }
}

fn next_free(
    generator: &StudentIdGenerator,
    known: &HashSet<String>,
    from: u32,
) -> Result<GeneratedId, StudentIdError> {
    let max = generator.config.max_sequence();
    let mut sequence = from;
    loop {
        if sequence > max {
            return Err(StudentIdError::Exhausted { from });
        }
        let id = generator.build_id(sequence)?;
        if !known.contains(&id_key(&id)) {
            return Ok(GeneratedId {
                id,
                sequence,
                is_unique: true,
            });
        }
        sequence += 1;
    }
}

fn run_batch(
    generator: &StudentIdGenerator,
    known: &mut HashSet<String>,
    count: usize,
    start_sequence: Option<u32>,
) -> Result<Vec<GeneratedId>, StudentIdError> {
    let mut cursor = start_sequence.unwrap_or(generator.config.starting_number);
    let available = usize::try_from(generator.config.max_sequence())
        .unwrap_or(usize::MAX)
        .saturating_add(1);
    let mut batch = Vec::with_capacity(count.min(available));

    for _ in 0..count {
        let generated = next_free(generator, known, cursor)?;
        known.insert(id_key(&generated.id));
        cursor = generated
            .sequence
            .checked_add(1)
            .ok_or(StudentIdError::Exhausted { from: cursor })?;
        batch.push(generated);
    }

    Ok(batch)
}
