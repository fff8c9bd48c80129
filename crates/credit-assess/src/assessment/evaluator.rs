use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{DerivedSnapshot, DerivedValue, RawInputs};
use super::numeric::finite_or_zero;
use super::registry::{
    CalculatorDescriptor, ConfigurationError, ConfigurationErrors, EvaluationPlan,
    FormulaRegistry, ResolvedDependencies,
};

/// Calculator that could not be evaluated in a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculatorFailure {
    pub calculator: String,
    pub error: ConfigurationError,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub snapshot: DerivedSnapshot,
    pub failures: Vec<CalculatorFailure>,
}

impl EvaluationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_for(&self, calculator: &str) -> Option<&ConfigurationError> {
        self.failures
            .iter()
            .find(|failure| failure.calculator == calculator)
            .map(|failure| &failure.error)
    }
}

/// Evaluates every registered calculator against one raw-input snapshot.
///
/// The plan is resolved once at construction. Each pass evaluates every plannable
/// calculator exactly once and hands the memoized value to all of its dependents.
pub struct FormulaEvaluator {
    registry: FormulaRegistry,
    plan: EvaluationPlan,
}

impl FormulaEvaluator {
    /// Lenient construction: broken calculators are reported per pass, the rest still run.
    pub fn new(registry: FormulaRegistry) -> Self {
        let plan = registry.plan();
        for blocked in plan.blocked() {
            warn!(calculator = %blocked.name, error = %blocked.error, "calculator excluded from evaluation");
        }
        Self { registry, plan }
    }

    /// Strict construction for startup: any unknown dependency or cycle is fatal.
    pub fn strict(registry: FormulaRegistry) -> Result<Self, ConfigurationErrors> {
        registry.validate()?;
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &FormulaRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> Vec<CalculatorDescriptor> {
        self.registry.descriptors()
    }

    pub fn evaluate_all(&self, inputs: &RawInputs) -> EvaluationReport {
        let calculators = self.registry.calculators();
        let mut values: BTreeMap<String, DerivedValue> = BTreeMap::new();

        for &position in self.plan.order() {
            let calculator = &calculators[position];
            let value = {
                let resolved = ResolvedDependencies::new(
                    calculator
                        .dependencies()
                        .iter()
                        .filter_map(|dependency| {
                            values
                                .get_key_value(*dependency)
                                .map(|(name, value)| (name.as_str(), value))
                        })
                        .collect(),
                );
                calculator.evaluate(inputs, &resolved)
            };

            let value = sanitize(calculator.name(), value);
            values.insert(calculator.name().to_string(), value);
        }

        let failures: Vec<CalculatorFailure> = self
            .plan
            .blocked()
            .iter()
            .map(|blocked| CalculatorFailure {
                calculator: blocked.name.clone(),
                error: blocked.error.clone(),
            })
            .collect();

        debug!(
            evaluated = values.len(),
            failed = failures.len(),
            inputs = inputs.len(),
            "evaluation pass complete"
        );

        EvaluationReport {
            snapshot: DerivedSnapshot::from_values(values),
            failures,
        }
    }
}

fn sanitize(calculator: &str, value: DerivedValue) -> DerivedValue {
    match value {
        DerivedValue::Number(number) if !number.is_finite() => {
            warn!(calculator, "non-finite result replaced with zero");
            DerivedValue::Number(0.0)
        }
        DerivedValue::Series(values) if values.iter().any(|value| !value.is_finite()) => {
            warn!(calculator, "non-finite series entries replaced with zero");
            DerivedValue::Series(values.into_iter().map(finite_or_zero).collect())
        }
        other => other,
    }
}
