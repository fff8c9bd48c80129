use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::calculators::{standard_registry, PolicyThresholds};
use super::domain::{DerivedSnapshot, RawInputs};
use super::evaluator::{CalculatorFailure, EvaluationReport, FormulaEvaluator};
use super::registry::{CalculatorDescriptor, ConfigurationError, ConfigurationErrors};
use super::scoring::{
    deserialize_selections, validate_scorecard, RiskAssessment, Scorecard, Selections,
};

/// Raw inputs and scorecard selections for one application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub inputs: RawInputs,
    #[serde(default, deserialize_with = "deserialize_selections")]
    pub selections: Selections,
}

/// Derived values, their display strings, and the risk classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub values: DerivedSnapshot,
    pub display: BTreeMap<String, String>,
    pub failures: Vec<CalculatorFailure>,
    pub risk: RiskAssessment,
}

/// Service composing the calculator evaluator and the scorecard.
pub struct AssessmentService {
    evaluator: Arc<FormulaEvaluator>,
    scorecard: Arc<Scorecard>,
}

impl AssessmentService {
    pub fn new(
        evaluator: FormulaEvaluator,
        scorecard: Scorecard,
    ) -> Result<Self, AssessmentServiceError> {
        validate_scorecard(&scorecard).map_err(AssessmentServiceError::Scorecard)?;

        info!(
            calculators = evaluator.registry().len(),
            parameters = scorecard.parameters.len(),
            bands = scorecard.bands.len(),
            "assessment service initialised"
        );

        Ok(Self {
            evaluator: Arc::new(evaluator),
            scorecard: Arc::new(scorecard),
        })
    }

    /// Built-in calculators under `policy` with the given scorecard. The registry must be sound.
    pub fn with_scorecard(
        policy: &PolicyThresholds,
        scorecard: Scorecard,
    ) -> Result<Self, AssessmentServiceError> {
        let registry = standard_registry(policy)?;
        let evaluator = FormulaEvaluator::strict(registry)?;
        Self::new(evaluator, scorecard)
    }

    pub fn standard(policy: &PolicyThresholds) -> Result<Self, AssessmentServiceError> {
        Self::with_scorecard(policy, Scorecard::standard())
    }

    pub fn derive(&self, inputs: &RawInputs) -> EvaluationReport {
        self.evaluator.evaluate_all(inputs)
    }

    pub fn score(&self, selections: &Selections) -> RiskAssessment {
        self.scorecard.assess(selections)
    }

    pub fn assess(&self, request: &AssessmentRequest) -> AssessmentReport {
        let EvaluationReport { snapshot, failures } = self.derive(&request.inputs);
        let display = self.display_values(&snapshot);
        let risk = self.score(&request.selections);

        AssessmentReport {
            values: snapshot,
            display,
            failures,
            risk,
        }
    }

    pub fn catalog(&self) -> Vec<CalculatorDescriptor> {
        self.evaluator.catalog()
    }

    pub fn scorecard(&self) -> &Scorecard {
        &self.scorecard
    }

    /// Each derived value rendered with its calculator's output format.
    pub fn display_values(&self, snapshot: &DerivedSnapshot) -> BTreeMap<String, String> {
        let registry = self.evaluator.registry();
        snapshot
            .iter()
            .filter_map(|(name, value)| {
                registry
                    .get(name)
                    .map(|calculator| (name.clone(), calculator.format().render(value)))
            })
            .collect()
    }
}

/// Error raised while building the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Registration(#[from] ConfigurationError),
    #[error(transparent)]
    Registry(#[from] ConfigurationErrors),
    #[error("invalid scorecard: {}", .0.join("; "))]
    Scorecard(Vec<String>),
}
