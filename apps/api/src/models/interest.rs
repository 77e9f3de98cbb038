use std::fmt;

use serde::{Deserialize, Serialize};

/// The six RIASEC interest dimensions in canonical order.
///
/// The declaration order is load-bearing: it is the stable tie-break order
/// for cluster labels and the question-to-dimension assignment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "R")]
    Realistic,
    #[serde(rename = "I")]
    Investigative,
    #[serde(rename = "A")]
    Artistic,
    #[serde(rename = "S")]
    Social,
    #[serde(rename = "E")]
    Enterprising,
    #[serde(rename = "C")]
    Conventional,
}

pub const DIMENSION_COUNT: usize = 6;

impl Dimension {
    pub const ALL: [Dimension; DIMENSION_COUNT] = [
        Dimension::Realistic,
        Dimension::Investigative,
        Dimension::Artistic,
        Dimension::Social,
        Dimension::Enterprising,
        Dimension::Conventional,
    ];

    /// Single-letter code used in cluster labels and profile summaries.
    pub fn code(self) -> char {
        match self {
            Dimension::Realistic => 'R',
            Dimension::Investigative => 'I',
            Dimension::Artistic => 'A',
            Dimension::Social => 'S',
            Dimension::Enterprising => 'E',
            Dimension::Conventional => 'C',
        }
    }

    /// O*NET "Element ID" of the occupational-interest element for this dimension.
    pub fn element_id(self) -> &'static str {
        match self {
            Dimension::Realistic => "1.B.1.a",
            Dimension::Investigative => "1.B.1.b",
            Dimension::Artistic => "1.B.1.c",
            Dimension::Social => "1.B.1.d",
            Dimension::Enterprising => "1.B.1.e",
            Dimension::Conventional => "1.B.1.f",
        }
    }

    pub fn from_element_id(element_id: &str) -> Option<Dimension> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.element_id() == element_id)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A point in RIASEC space. Used for users, occupations and centroids alike.
///
/// Serializes as `{"R": .., "I": .., "A": .., "S": .., "E": .., "C": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InterestVector {
    #[serde(rename = "R", default)]
    pub realistic: f64,
    #[serde(rename = "I", default)]
    pub investigative: f64,
    #[serde(rename = "A", default)]
    pub artistic: f64,
    #[serde(rename = "S", default)]
    pub social: f64,
    #[serde(rename = "E", default)]
    pub enterprising: f64,
    #[serde(rename = "C", default)]
    pub conventional: f64,
}

impl InterestVector {
    pub fn from_array(values: [f64; DIMENSION_COUNT]) -> Self {
        Self {
            realistic: values[0],
            investigative: values[1],
            artistic: values[2],
            social: values[3],
            enterprising: values[4],
            conventional: values[5],
        }
    }

    pub fn to_array(&self) -> [f64; DIMENSION_COUNT] {
        [
            self.realistic,
            self.investigative,
            self.artistic,
            self.social,
            self.enterprising,
            self.conventional,
        ]
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.to_array()[dimension.index()]
    }

    pub fn is_zero(&self) -> bool {
        self.to_array().iter().all(|v| *v == 0.0)
    }

    /// Compact one-line rendering, e.g. `R:4.50, I:3.25, A:2.00, S:4.75, E:3.80, C:4.10`.
    pub fn summary(&self) -> String {
        Dimension::ALL
            .iter()
            .map(|d| format!("{}:{:.2}", d.code(), self.get(*d)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_codes() {
        let codes: String = Dimension::ALL.iter().map(|d| d.code()).collect();
        assert_eq!(codes, "RIASEC");
    }

    #[test]
    fn test_element_id_round_trips_for_every_dimension() {
        for d in Dimension::ALL {
            assert_eq!(Dimension::from_element_id(d.element_id()), Some(d));
        }
        assert_eq!(Dimension::from_element_id("1.B.2.a"), None);
    }

    #[test]
    fn test_vector_serializes_with_dimension_codes() {
        let v = InterestVector::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let json = serde_json::to_value(v).unwrap();
        assert_eq!(json["R"], 1.0);
        assert_eq!(json["C"], 6.0);
    }

    #[test]
    fn test_summary_format() {
        let v = InterestVector::from_array([4.5, 3.25, 2.0, 4.75, 3.8, 4.1]);
        assert_eq!(v.summary(), "R:4.50, I:3.25, A:2.00, S:4.75, E:3.80, C:4.10");
    }
}
