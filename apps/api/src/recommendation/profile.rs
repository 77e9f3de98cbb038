//! Profile Scorer: questionnaire answers → six dimension means.
//!
//! The questionnaire has 48 questions, eight per dimension in canonical order:
//! q0–q7 Realistic, q8–q15 Investigative, …, q40–q47 Conventional.
//! Scoring is pure; validation of the raw request happens in `into_profile`.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::models::interest::{Dimension, InterestVector, DIMENSION_COUNT};

pub const QUESTIONS_PER_DIMENSION: usize = 8;
pub const QUESTION_COUNT: usize = QUESTIONS_PER_DIMENSION * DIMENSION_COUNT;
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("Unknown question '{0}' (expected q0..q{})", QUESTION_COUNT - 1)]
    UnknownQuestion(String),

    #[error("Rating for {question} must be between {} and {}, got {value}", RATING_MIN, RATING_MAX)]
    RatingOutOfRange { question: String, value: String },
}

/// A single rating as sent by clients: `3` or `"3"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RatingValue {
    Number(i64),
    Text(String),
}

/// Per-dimension answer lists, e.g. `{"R": [5, 4, ...], "I": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionAnswers {
    #[serde(rename = "R", default)]
    pub realistic: Vec<RatingValue>,
    #[serde(rename = "I", default)]
    pub investigative: Vec<RatingValue>,
    #[serde(rename = "A", default)]
    pub artistic: Vec<RatingValue>,
    #[serde(rename = "S", default)]
    pub social: Vec<RatingValue>,
    #[serde(rename = "E", default)]
    pub enterprising: Vec<RatingValue>,
    #[serde(rename = "C", default)]
    pub conventional: Vec<RatingValue>,
}

/// Recommendation request body. Either form is accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuestionnaireAnswers {
    ByDimension(DimensionAnswers),
    /// Keyed by `"q<index>"` or `"<index>"`.
    ByQuestion(BTreeMap<String, RatingValue>),
}

impl QuestionnaireAnswers {
    /// Validates every key and rating, then scores.
    pub fn into_profile(self) -> Result<InterestVector, ProfileError> {
        match self {
            QuestionnaireAnswers::ByQuestion(raw) => {
                let mut answers = BTreeMap::new();
                for (key, value) in raw {
                    let index = parse_question_key(&key)?;
                    answers.insert(index, parse_rating(&key, &value)?);
                }
                Ok(score_answers(&answers))
            }
            QuestionnaireAnswers::ByDimension(lists) => {
                let columns = [
                    (Dimension::Realistic, lists.realistic),
                    (Dimension::Investigative, lists.investigative),
                    (Dimension::Artistic, lists.artistic),
                    (Dimension::Social, lists.social),
                    (Dimension::Enterprising, lists.enterprising),
                    (Dimension::Conventional, lists.conventional),
                ];
                let mut ratings: [Vec<u8>; DIMENSION_COUNT] = Default::default();
                for (dimension, values) in columns {
                    ratings[dimension.index()] = values
                        .iter()
                        .map(|v| parse_rating(&dimension.to_string(), v))
                        .collect::<Result<_, _>>()?;
                }
                Ok(score_dimension_lists(&ratings))
            }
        }
    }
}

/// Dimension a question index belongs to, or `None` past the last question.
pub fn dimension_for_question(index: usize) -> Option<Dimension> {
    Dimension::ALL.get(index / QUESTIONS_PER_DIMENSION).copied()
}

/// Averages answers per dimension. Unanswered dimensions score 0.0; indices
/// beyond the questionnaire are ignored.
pub fn score_answers(answers: &BTreeMap<usize, u8>) -> InterestVector {
    let mut ratings: [Vec<u8>; DIMENSION_COUNT] = Default::default();
    for (&index, &rating) in answers {
        if let Some(dimension) = dimension_for_question(index) {
            ratings[dimension.index()].push(rating);
        }
    }
    score_dimension_lists(&ratings)
}

pub fn score_dimension_lists(ratings: &[Vec<u8>; DIMENSION_COUNT]) -> InterestVector {
    InterestVector::from_array(std::array::from_fn(|i| mean(&ratings[i])))
}

fn mean(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: u32 = values.iter().map(|v| u32::from(*v)).sum();
    f64::from(sum) / values.len() as f64
}

fn parse_question_key(key: &str) -> Result<usize, ProfileError> {
    key.strip_prefix('q')
        .unwrap_or(key)
        .parse::<usize>()
        .ok()
        .filter(|i| *i < QUESTION_COUNT)
        .ok_or_else(|| ProfileError::UnknownQuestion(key.to_string()))
}

fn parse_rating(question: &str, value: &RatingValue) -> Result<u8, ProfileError> {
    let (parsed, raw) = match value {
        RatingValue::Number(n) => (u8::try_from(*n).ok(), n.to_string()),
        RatingValue::Text(s) => (s.trim().parse::<u8>().ok(), s.clone()),
    };
    parsed
        .filter(|r| (RATING_MIN..=RATING_MAX).contains(r))
        .ok_or_else(|| ProfileError::RatingOutOfRange {
            question: question.to_string(),
            value: raw,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uniform(rating: u8) -> BTreeMap<usize, u8> {
        (0..QUESTION_COUNT).map(|i| (i, rating)).collect()
    }

    #[test]
    fn test_all_neutral_answers_score_midpoint() {
        let profile = score_answers(&uniform(3));
        assert_eq!(profile, InterestVector::from_array([3.0; DIMENSION_COUNT]));
    }

    #[test]
    fn test_max_realistic_min_everything_else() {
        let answers: BTreeMap<usize, u8> = (0..QUESTION_COUNT)
            .map(|i| (i, if i < QUESTIONS_PER_DIMENSION { 5 } else { 1 }))
            .collect();

        let profile = score_answers(&answers);

        assert_eq!(profile.realistic, 5.0);
        for d in &Dimension::ALL[1..] {
            assert_eq!(profile.get(*d), 1.0, "dimension {d}");
        }
    }

    #[test]
    fn test_unanswered_dimension_scores_zero() {
        let answers: BTreeMap<usize, u8> = (0..8).map(|i| (i, 4)).collect();
        let profile = score_answers(&answers);
        assert_eq!(profile.realistic, 4.0);
        assert_eq!(profile.conventional, 0.0);
    }

    #[test]
    fn test_mean_keeps_exact_fraction() {
        let answers: BTreeMap<usize, u8> = [(8, 1), (9, 2), (10, 2)].into_iter().collect();
        let profile = score_answers(&answers);
        assert_eq!(profile.investigative, 5.0 / 3.0);
    }

    #[test]
    fn test_question_assignment_is_canonical() {
        assert_eq!(dimension_for_question(0), Some(Dimension::Realistic));
        assert_eq!(dimension_for_question(7), Some(Dimension::Realistic));
        assert_eq!(dimension_for_question(8), Some(Dimension::Investigative));
        assert_eq!(dimension_for_question(47), Some(Dimension::Conventional));
        assert_eq!(dimension_for_question(48), None);
    }

    #[test]
    fn test_request_keyed_by_question_with_string_values() {
        let body: serde_json::Map<String, serde_json::Value> =
            (0..QUESTION_COUNT).map(|i| (format!("q{i}"), json!("3"))).collect();
        let answers: QuestionnaireAnswers = serde_json::from_value(body.into()).unwrap();

        let profile = answers.into_profile().unwrap();
        assert_eq!(profile, InterestVector::from_array([3.0; DIMENSION_COUNT]));
    }

    #[test]
    fn test_request_keyed_by_dimension() {
        let answers: QuestionnaireAnswers =
            serde_json::from_value(json!({"R": [5, 4], "S": ["2"]})).unwrap();
        assert!(matches!(answers, QuestionnaireAnswers::ByDimension(_)));

        let profile = answers.into_profile().unwrap();
        assert_eq!(profile.realistic, 4.5);
        assert_eq!(profile.social, 2.0);
        assert_eq!(profile.artistic, 0.0);
    }

    #[test]
    fn test_rejects_rating_out_of_range() {
        let answers: QuestionnaireAnswers = serde_json::from_value(json!({"q3": 9})).unwrap();
        assert_eq!(
            answers.into_profile(),
            Err(ProfileError::RatingOutOfRange {
                question: "q3".to_string(),
                value: "9".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_unknown_question() {
        let answers: QuestionnaireAnswers = serde_json::from_value(json!({"q48": 3})).unwrap();
        assert_eq!(
            answers.into_profile(),
            Err(ProfileError::UnknownQuestion("q48".to_string()))
        );
    }
}
