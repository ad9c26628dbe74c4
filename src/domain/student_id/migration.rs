use super::config::StudentIdConfig;
use super::error::StudentIdError;
use super::generator::StudentIdGenerator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationEntry {
    pub old_id: String,
    pub new_id: Option<String>,
    pub error: Option<String>,
}

impl MigrationEntry {
    fn migrated(old_id: &str, new_id: String) -> Self {
        Self {
            old_id: old_id.to_string(),
            new_id: Some(new_id),
            error: None,
        }
    }

    fn failed(old_id: &str, error: String) -> Self {
        Self {
            old_id: old_id.to_string(),
            new_id: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.new_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    pub entries: Vec<MigrationEntry>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Maps every old id onto the new config, keeping its sequence and year.
///
/// Only an invalid config is an error. Per-id problems (unparseable id,
/// sequence too wide for the new pattern, two old ids landing on the same new
/// id) mark that entry failed and the rest of the plan is still computed.
pub fn generate_migration_plan<S: AsRef<str>>(
    old_ids: &[S],
    old_config: &StudentIdConfig,
    new_config: &StudentIdConfig,
    current_year: i32,
) -> Result<MigrationPlan, StudentIdError> {
    generate_migration_plan_with_existing(
        old_ids,
        old_config,
        new_config,
        current_year,
        &[] as &[&str],
    )
}

/// Like [`generate_migration_plan`], but also fails entries whose new id is
/// already issued under the new config. An id that migrates onto itself is
/// not a collision.
pub fn generate_migration_plan_with_existing<S: AsRef<str>, E: AsRef<str>>(
    old_ids: &[S],
    old_config: &StudentIdConfig,
    new_config: &StudentIdConfig,
    current_year: i32,
    existing: &[E],
) -> Result<MigrationPlan, StudentIdError> {
    let old_generator = StudentIdGenerator::new(old_config.clone(), current_year, Vec::<String>::new())?;
    let new_generator = StudentIdGenerator::new(new_config.clone(), current_year, Vec::<String>::new())?;

    let issued: HashSet<String> = existing
        .iter()
        .map(|id| id.as_ref().trim().to_uppercase())
        .collect();
    let mut planned: HashSet<String> = HashSet::new();
    let mut entries = Vec::with_capacity(old_ids.len());

    for old_id in old_ids {
        let old_id = old_id.as_ref();
        let entry = match old_generator.parse_components(old_id.trim()) {
            None => MigrationEntry::failed(
                old_id,
                format!("ID does not match the old pattern {}", old_config.pattern),
            ),
            Some(components) => {
                let year = components.year.unwrap_or(current_year);
                match new_generator.build_id_for_year(components.sequence, year) {
                    Err(err) => MigrationEntry::failed(old_id, err.to_string()),
                    Ok(new_id)
                        if !new_id.eq_ignore_ascii_case(old_id.trim())
                            && issued.contains(&new_id.to_uppercase()) =>
                    {
                        MigrationEntry::failed(
                            old_id,
                            format!("New ID {new_id} collides with an already issued ID"),
                        )
                    }
                    Ok(new_id) if !planned.insert(new_id.to_uppercase()) => MigrationEntry::failed(
                        old_id,
                        format!("New ID {new_id} collides with another migrated ID"),
                    ),
                    Ok(new_id) => MigrationEntry::migrated(old_id, new_id),
                }
            }
        };
        entries.push(entry);
    }

    let succeeded = entries.iter().filter(|entry| entry.is_success()).count();
    let failed = entries.len() - succeeded;

    Ok(MigrationPlan {
        entries,
        succeeded,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::student_id::{CaseFormat, YearFormat};

    fn old_config() -> StudentIdConfig {
        StudentIdConfig::default()
    }

    fn new_config() -> StudentIdConfig {
        StudentIdConfig {
            prefix: "SCH".to_string(),
            year_format: YearFormat::Short,
            sequence_length: 4,
            separator: "-".to_string(),
            case_format: CaseFormat::Upper,
            ..StudentIdConfig::default()
        }
    }

    #[test]
    fn migrates_preserving_sequence_and_year() {
        let plan = generate_migration_plan(
            &["STU2023001", "STU2024017"],
            &old_config(),
            &new_config(),
            2024,
        )
        .unwrap();

        assert_eq!(plan.succeeded, 2);
        assert_eq!(plan.entries[0].new_id.as_deref(), Some("SCH-23-0001"));
        assert_eq!(plan.entries[1].new_id.as_deref(), Some("SCH-24-0017"));
    }

    #[test]
    fn unparseable_ids_fail_without_aborting() {
        let plan = generate_migration_plan(
            &["STU2023001", "garbage", "STU2024002"],
            &old_config(),
            &new_config(),
            2024,
        )
        .unwrap();

        assert_eq!(plan.entries.len(), 3);
        assert_eq!(plan.succeeded, 2);
        assert_eq!(plan.failed, 1);
        let failed = &plan.entries[1];
        assert_eq!(failed.old_id, "garbage");
        assert!(failed.new_id.is_none());
        assert!(failed.error.as_deref().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn narrower_sequence_reports_overflow() {
        let narrow = StudentIdConfig {
            sequence_length: 2,
            ..new_config()
        };
        let plan =
            generate_migration_plan(&["STU2024150"], &old_config(), &narrow, 2024).unwrap();
        assert_eq!(plan.failed, 1);
        assert!(plan.entries[0].error.as_deref().unwrap().contains("exceeds"));
    }

    #[test]
    fn collisions_inside_plan_are_failures() {
        let yearless = StudentIdConfig {
            include_year: false,
            ..new_config()
        };
        let plan = generate_migration_plan(
            &["STU2023001", "STU2024001"],
            &old_config(),
            &yearless,
            2024,
        )
        .unwrap();
        assert_eq!(plan.entries[0].new_id.as_deref(), Some("SCH-0001"));
        assert!(plan.entries[1].error.as_deref().unwrap().contains("collides"));
    }

    #[test]
    fn already_issued_ids_are_collisions() {
        let plan = generate_migration_plan_with_existing(
            &["STU2024001", "STU2024002"],
            &old_config(),
            &new_config(),
            2024,
            &["sch-24-0002"],
        )
        .unwrap();
        assert_eq!(plan.entries[0].new_id.as_deref(), Some("SCH-24-0001"));
        assert!(plan.entries[1].error.as_deref().unwrap().contains("already issued"));
        assert_eq!(plan.failed, 1);

        // Unchanged config maps ids onto themselves.
        let same = generate_migration_plan_with_existing(
            &["STU2024001"],
            &old_config(),
            &old_config(),
            2024,
            &["STU2024001"],
        )
        .unwrap();
        assert_eq!(same.succeeded, 1);
    }

    #[test]
    fn every_entry_has_new_id_or_error() {
        let inputs = ["STU2024001", "", "STU20241", "stu2024009", "STU2024002"];
        let plan = generate_migration_plan(&inputs, &old_config(), &new_config(), 2024).unwrap();
        assert_eq!(plan.entries.len(), inputs.len());
        for entry in &plan.entries {
            assert!(entry.new_id.is_some() ^ entry.error.is_some());
        }
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let broken = StudentIdConfig {
            pattern: "{PREFIX}".to_string(),
            ..new_config()
        };
        assert!(generate_migration_plan(&["STU2024001"], &old_config(), &broken, 2024).is_err());
    }
}
