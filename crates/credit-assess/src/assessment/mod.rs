//! Credit assessment engine: dependency-resolved derivations over raw application
//! inputs, plus a weighted scorecard that classifies the applicant into a risk band.

pub mod calculators;
pub mod domain;
pub mod evaluator;
pub mod import;
pub mod numeric;
pub mod registry;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use calculators::{standard_registry, DeviationCode, PolicyThresholds};
pub use domain::{DerivedSnapshot, DerivedValue, OutputFormat, RawInputs, RawValue};
pub use evaluator::{CalculatorFailure, EvaluationReport, FormulaEvaluator};
pub use import::InputImportError;
pub use registry::{
    Calculator, CalculatorDescriptor, ConfigurationError, ConfigurationErrors, FormulaFn,
    FormulaRegistry, ResolvedDependencies,
};
pub use router::assessment_router;
pub use scoring::{
    deserialize_selections, validate_scorecard, ParameterContribution, RiskAssessment, RiskBand, ScoreOption,
    Scorecard, ScoringParameter, Selections,
};
pub use service::{
    AssessmentReport, AssessmentRequest, AssessmentService, AssessmentServiceError,
};
