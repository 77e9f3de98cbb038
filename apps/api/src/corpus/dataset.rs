//! Reference dataset records and the occupation ⋈ interest join.
//!
//! Every file is a JSON array of records keyed by the O*NET column names.
//! Unknown columns are ignored so full O*NET exports load unchanged.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::corpus::CorpusError;
use crate::models::interest::{Dimension, DIMENSION_COUNT};

pub const OCCUPATIONS_FILE: &str = "occupations.json";
pub const INTERESTS_FILE: &str = "interests.json";

/// Scale ID of the occupational-interest ratings.
pub const INTEREST_SCALE: &str = "OI";

#[derive(Debug, Clone, Deserialize)]
pub struct OccupationRecord {
    #[serde(rename = "O*NET-SOC Code")]
    pub code: String,
    #[serde(rename = "Title")]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterestRecord {
    #[serde(rename = "O*NET-SOC Code")]
    pub code: String,
    #[serde(rename = "Scale ID")]
    pub scale_id: String,
    #[serde(rename = "Element ID")]
    pub element_id: String,
    #[serde(rename = "Data Value")]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompetencyRecord {
    #[serde(rename = "O*NET-SOC Code")]
    pub code: String,
    #[serde(rename = "Scale ID")]
    pub scale_id: String,
    #[serde(rename = "Element Name")]
    pub element_name: String,
    #[serde(rename = "Data Value")]
    pub value: Option<f64>,
}

/// An occupation joined with its zero-filled interest scores, before clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOccupation {
    pub code: String,
    pub title: String,
    pub scores: [f64; DIMENSION_COUNT],
}

/// Reads a JSON array of records. A missing file is reported as `MissingFile`
/// so callers can tell "absent" apart from "present but broken".
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CorpusError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CorpusError::MissingFile(path.to_path_buf())
        } else {
            CorpusError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let records: Vec<T> = serde_json::from_str(&text).map_err(|e| CorpusError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Pivots `OI` interest rows into one partially-filled vector per occupation.
/// Duplicate (code, element) rows are averaged; rows without a value are skipped.
pub fn pivot_interests(
    records: &[InterestRecord],
) -> HashMap<String, [Option<f64>; DIMENSION_COUNT]> {
    let mut sums: HashMap<&str, [(f64, u32); DIMENSION_COUNT]> = HashMap::new();

    for record in records {
        if record.scale_id != INTEREST_SCALE {
            continue;
        }
        let (Some(dimension), Some(value)) =
            (Dimension::from_element_id(&record.element_id), record.value)
        else {
            continue;
        };
        let slot = &mut sums.entry(record.code.as_str()).or_default()[dimension.index()];
        slot.0 += value;
        slot.1 += 1;
    }

    sums.into_iter()
        .map(|(code, cells)| {
            let means = cells.map(|(sum, count)| (count > 0).then(|| sum / count as f64));
            (code.to_string(), means)
        })
        .collect()
}

/// Inner join on occupation code, keeping occupation-file order.
/// Missing dimensions are zero-filled; repeated occupation codes keep the first title.
pub fn join_profiles(
    occupations: &[OccupationRecord],
    interests: &HashMap<String, [Option<f64>; DIMENSION_COUNT]>,
) -> Vec<RawOccupation> {
    let mut seen = HashSet::new();

    occupations
        .iter()
        .filter(|o| seen.insert(o.code.as_str()))
        .filter_map(|o| {
            interests.get(&o.code).map(|cells| RawOccupation {
                code: o.code.clone(),
                title: o.title.clone(),
                scores: cells.map(|v| v.unwrap_or(0.0)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interest(code: &str, element: &str, value: Option<f64>) -> InterestRecord {
        InterestRecord {
            code: code.to_string(),
            scale_id: INTEREST_SCALE.to_string(),
            element_id: element.to_string(),
            value,
        }
    }

    fn occupation(code: &str, title: &str) -> OccupationRecord {
        OccupationRecord {
            code: code.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_pivot_ignores_other_scales() {
        let mut high_point = interest("11-1011.00", "1.B.1.a", Some(7.0));
        high_point.scale_id = "IH".to_string();
        let pivot = pivot_interests(&[high_point, interest("11-1011.00", "1.B.1.b", Some(2.5))]);

        let cells = pivot["11-1011.00"];
        assert_eq!(cells[0], None);
        assert_eq!(cells[1], Some(2.5));
    }

    #[test]
    fn test_pivot_averages_duplicates() {
        let pivot = pivot_interests(&[
            interest("x", "1.B.1.c", Some(2.0)),
            interest("x", "1.B.1.c", Some(4.0)),
        ]);
        assert_eq!(pivot["x"][Dimension::Artistic.index()], Some(3.0));
    }

    #[test]
    fn test_pivot_skips_missing_values_and_unknown_elements() {
        let pivot = pivot_interests(&[
            interest("x", "1.B.1.d", None),
            interest("x", "1.B.2.a", Some(5.0)),
            interest("x", "1.B.1.e", Some(1.5)),
        ]);
        assert_eq!(pivot["x"][Dimension::Social.index()], None);
        assert_eq!(pivot["x"][Dimension::Enterprising.index()], Some(1.5));
    }

    #[test]
    fn test_join_is_inner_and_keeps_occupation_order() {
        let pivot = pivot_interests(&[
            interest("b", "1.B.1.a", Some(1.0)),
            interest("a", "1.B.1.f", Some(6.0)),
        ]);
        let occupations = vec![
            occupation("a", "Accountant"),
            occupation("z", "No interest data"),
            occupation("b", "Bricklayer"),
        ];

        let joined = join_profiles(&occupations, &pivot);

        let codes: Vec<&str> = joined.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, vec!["a", "b"]);
        assert_eq!(joined[0].scores, [0.0, 0.0, 0.0, 0.0, 0.0, 6.0]);
    }

    #[test]
    fn test_join_keeps_first_of_repeated_codes() {
        let pivot = pivot_interests(&[interest("a", "1.B.1.a", Some(1.0))]);
        let occupations = vec![occupation("a", "First"), occupation("a", "Second")];

        let joined = join_profiles(&occupations, &pivot);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].title, "First");
    }

    #[test]
    fn test_records_deserialize_from_onet_columns() {
        let json = r#"[{"O*NET-SOC Code": "15-1252.00", "Title": "Software Developers", "Description": "ignored"}]"#;
        let records: Vec<OccupationRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].code, "15-1252.00");
        assert_eq!(records[0].title, "Software Developers");
    }

    #[test]
    fn test_read_records_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_records::<OccupationRecord>(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(CorpusError::MissingFile(_))));
    }

    #[test]
    fn test_read_records_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let result = read_records::<OccupationRecord>(&path);
        assert!(matches!(result, Err(CorpusError::Parse { .. })));
    }
}
