//! Competency Index: occupation code → top knowledge / skills / abilities labels.
//!
//! Built once from the three O*NET competency tables. Only importance-scale
//! (`IM`) rows count; each occupation keeps its five most important elements.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::corpus::dataset::{read_records, CompetencyRecord};

pub const TOP_COMPETENCIES: usize = 5;
/// Scale ID marking importance ratings; level (`LV`) rows are ignored.
pub const IMPORTANCE_SCALE: &str = "IM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetencyCategory {
    Knowledge,
    Skills,
    Abilities,
}

impl CompetencyCategory {
    pub const ALL: [CompetencyCategory; 3] = [
        CompetencyCategory::Knowledge,
        CompetencyCategory::Skills,
        CompetencyCategory::Abilities,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            CompetencyCategory::Knowledge => "knowledge.json",
            CompetencyCategory::Skills => "skills.json",
            CompetencyCategory::Abilities => "abilities.json",
        }
    }
}

/// The three label lists for one occupation. Empty lists when unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Competencies {
    pub knowledge: Vec<String>,
    pub skills: Vec<String>,
    pub abilities: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompetencyIndex {
    knowledge: HashMap<String, Vec<String>>,
    skills: HashMap<String, Vec<String>>,
    abilities: HashMap<String, Vec<String>>,
}

impl CompetencyIndex {
    pub fn from_records(
        knowledge: &[CompetencyRecord],
        skills: &[CompetencyRecord],
        abilities: &[CompetencyRecord],
    ) -> Self {
        Self {
            knowledge: top_elements(knowledge),
            skills: top_elements(skills),
            abilities: top_elements(abilities),
        }
    }

    /// Loads all three tables from `data_dir`. A missing or unreadable table is
    /// not fatal: that category stays empty and a warning is returned.
    pub fn load(data_dir: &Path) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let [knowledge, skills, abilities] = CompetencyCategory::ALL.map(|category| {
            let path = data_dir.join(category.file_name());
            read_records::<CompetencyRecord>(&path).unwrap_or_else(|e| {
                warn!("Competency table skipped: {e}");
                warnings.push(e.to_string());
                Vec::new()
            })
        });

        let index = Self::from_records(&knowledge, &skills, &abilities);
        for category in CompetencyCategory::ALL {
            info!(
                "Loaded {:?} competencies for {} occupations",
                category,
                index.occupation_count(category)
            );
        }

        (index, warnings)
    }

    pub fn lookup(&self, code: &str) -> Competencies {
        let get = |map: &HashMap<String, Vec<String>>| map.get(code).cloned().unwrap_or_default();
        Competencies {
            knowledge: get(&self.knowledge),
            skills: get(&self.skills),
            abilities: get(&self.abilities),
        }
    }

    pub fn occupation_count(&self, category: CompetencyCategory) -> usize {
        match category {
            CompetencyCategory::Knowledge => self.knowledge.len(),
            CompetencyCategory::Skills => self.skills.len(),
            CompetencyCategory::Abilities => self.abilities.len(),
        }
    }
}

/// Groups importance rows by occupation and keeps the top `TOP_COMPETENCIES`
/// element names by descending rating. Equal ratings keep file order.
fn top_elements(records: &[CompetencyRecord]) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<&str, Vec<(f64, &str)>> = HashMap::new();
    for record in records {
        if record.scale_id != IMPORTANCE_SCALE {
            continue;
        }
        if let Some(value) = record.value {
            grouped
                .entry(record.code.as_str())
                .or_default()
                .push((value, record.element_name.as_str()));
        }
    }

    grouped
        .into_iter()
        .map(|(code, mut rated)| {
            rated.sort_by(|a, b| b.0.total_cmp(&a.0));
            let labels = rated
                .into_iter()
                .take(TOP_COMPETENCIES)
                .map(|(_, name)| name.to_string())
                .collect();
            (code.to_string(), labels)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(code: &str, scale: &str, name: &str, value: f64) -> CompetencyRecord {
        CompetencyRecord {
            code: code.to_string(),
            scale_id: scale.to_string(),
            element_name: name.to_string(),
            value: Some(value),
        }
    }

    #[test]
    fn test_keeps_top_five_by_importance() {
        let records: Vec<CompetencyRecord> = (0..8)
            .map(|i| rec("15-1252.00", "IM", &format!("K{i}"), i as f64 * 0.5))
            .collect();
        let index = CompetencyIndex::from_records(&records, &[], &[]);

        let found = index.lookup("15-1252.00");
        assert_eq!(found.knowledge, vec!["K7", "K6", "K5", "K4", "K3"]);
        assert!(found.skills.is_empty());
    }

    #[test]
    fn test_ignores_level_scale() {
        let records = vec![
            rec("a", "LV", "Level Only", 7.0),
            rec("a", "IM", "Important", 3.0),
        ];
        let index = CompetencyIndex::from_records(&[], &records, &[]);
        assert_eq!(index.lookup("a").skills, vec!["Important"]);
    }

    #[test]
    fn test_equal_ratings_keep_file_order() {
        let records = vec![
            rec("a", "IM", "First", 4.0),
            rec("a", "IM", "Second", 4.0),
            rec("a", "IM", "Top", 4.5),
        ];
        let index = CompetencyIndex::from_records(&[], &[], &records);
        assert_eq!(index.lookup("a").abilities, vec!["Top", "First", "Second"]);
    }

    #[test]
    fn test_unknown_code_yields_three_empty_lists() {
        let index = CompetencyIndex::from_records(&[rec("a", "IM", "X", 1.0)], &[], &[]);
        assert_eq!(index.lookup("99-9999.99"), Competencies::default());
    }

    #[test]
    fn test_load_tolerates_missing_tables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("skills.json"),
            r#"[{"O*NET-SOC Code": "a", "Scale ID": "IM", "Element Name": "Writing", "Data Value": 3.9}]"#,
        )
        .unwrap();

        let (index, warnings) = CompetencyIndex::load(dir.path());

        assert_eq!(warnings.len(), 2);
        assert_eq!(index.lookup("a").skills, vec!["Writing"]);
        assert_eq!(index.occupation_count(CompetencyCategory::Knowledge), 0);
    }
}
