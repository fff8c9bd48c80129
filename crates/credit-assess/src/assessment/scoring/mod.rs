//! Weighted scorecard and risk-band classification.

mod standard;
mod validation;

pub use validation::validate_scorecard;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::numeric::{finite_or_zero, round_to};

/// Parameter name to the selected option label.
pub type Selections = BTreeMap<String, String>;

/// Deserialize selections where an unanswered parameter may be sent as `null`.
///
/// Null entries are dropped, so they score like an omitted parameter.
pub fn deserialize_selections<'de, D>(deserializer: D) -> Result<Selections, D::Error>
where
    D: Deserializer<'de>,
{
    let answers = BTreeMap::<String, Option<String>>::deserialize(deserializer)?;
    Ok(answers
        .into_iter()
        .filter_map(|(parameter, label)| label.map(|label| (parameter, label)))
        .collect())
}

/// Selectable answer for a scoring parameter, worth `points` on a 0..=100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOption {
    pub label: String,
    pub points: f64,
}

impl ScoreOption {
    pub fn new(label: impl Into<String>, points: f64) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// Categorical question contributing `points × weight / 100` to the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringParameter {
    pub name: String,
    pub weight: f64,
    pub options: Vec<ScoreOption>,
}

impl ScoringParameter {
    pub fn new(name: impl Into<String>, weight: f64, options: Vec<ScoreOption>) -> Self {
        Self {
            name: name.into(),
            weight,
            options,
        }
    }

    /// Exact label match.
    pub fn option(&self, label: &str) -> Option<&ScoreOption> {
        self.options.iter().find(|option| option.label == label)
    }

    pub fn max_points(&self) -> f64 {
        self.options
            .iter()
            .map(|option| option.points)
            .fold(0.0, f64::max)
    }
}

/// Named score range with display metadata. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBand {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub color: String,
    pub description: String,
}

impl RiskBand {
    pub fn new(
        name: impl Into<String>,
        min: f64,
        max: f64,
        color: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            color: color.into(),
            description: description.into(),
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }
}

/// How one parameter contributed to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterContribution {
    pub parameter: String,
    pub weight: f64,
    pub selected: Option<String>,
    pub matched: bool,
    pub points: f64,
    pub contribution: f64,
}

/// Composite score with its band and the per-parameter audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub band: RiskBand,
    pub classified: bool,
    pub contributions: Vec<ParameterContribution>,
}

/// Scoring parameters and risk bands, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub parameters: Vec<ScoringParameter>,
    pub bands: Vec<RiskBand>,
    /// Band returned for scores that fall between configured ranges.
    pub default_band: RiskBand,
}

impl Scorecard {
    pub fn new(
        parameters: Vec<ScoringParameter>,
        bands: Vec<RiskBand>,
        default_band: RiskBand,
    ) -> Self {
        Self {
            parameters,
            bands,
            default_band,
        }
    }

    /// The scorecard used when no custom configuration is supplied.
    pub fn standard() -> Self {
        standard::standard_scorecard()
    }

    pub fn contributions(&self, selections: &Selections) -> Vec<ParameterContribution> {
        self.parameters
            .iter()
            .map(|parameter| {
                let selected = selections.get(&parameter.name);
                let option = selected.and_then(|label| parameter.option(label));
                let points = option.map(|option| finite_or_zero(option.points)).unwrap_or(0.0);
                ParameterContribution {
                    parameter: parameter.name.clone(),
                    weight: parameter.weight,
                    selected: selected.cloned(),
                    matched: option.is_some(),
                    points,
                    contribution: points * finite_or_zero(parameter.weight) / 100.0,
                }
            })
            .collect()
    }

    /// Weighted composite rounded to one decimal. Missing or unknown selections score zero.
    pub fn score(&self, selections: &Selections) -> f64 {
        let total: f64 = self
            .contributions(selections)
            .iter()
            .map(|contribution| contribution.contribution)
            .sum();
        round_to(total, 1)
    }

    /// First band containing `score`, otherwise the default band.
    pub fn classify(&self, score: f64) -> &RiskBand {
        self.matching_band(score).unwrap_or(&self.default_band)
    }

    fn matching_band(&self, score: f64) -> Option<&RiskBand> {
        self.bands.iter().find(|band| band.contains(score))
    }

    pub fn assess(&self, selections: &Selections) -> RiskAssessment {
        let contributions = self.contributions(selections);
        let score = round_to(
            contributions
                .iter()
                .map(|contribution| contribution.contribution)
                .sum(),
            1,
        );
        let matched = self.matching_band(score);

        RiskAssessment {
            score,
            band: matched.unwrap_or(&self.default_band).clone(),
            classified: matched.is_some(),
            contributions,
        }
    }

    /// Highest composite reachable when every parameter takes its best option.
    pub fn max_score(&self) -> f64 {
        round_to(
            self.parameters
                .iter()
                .map(|parameter| parameter.max_points() * parameter.weight / 100.0)
                .sum(),
            1,
        )
    }
}

impl Default for Scorecard {
    fn default() -> Self {
        Self::standard()
    }
}
