mod plan;

pub use plan::{BlockedCalculator, EvaluationPlan};

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use super::domain::{DerivedValue, OutputFormat, RawInputs};
use super::numeric::finite_or_zero;

/// Named, pure unit of derivation. The name doubles as the output key in the snapshot.
///
/// `dependencies` lists every calculator whose value `evaluate` reads through
/// [`ResolvedDependencies`]. Raw fields are never declared; any calculator may read any field.
pub trait Calculator: Send + Sync {
    fn name(&self) -> &str;

    fn dependencies(&self) -> &[&str] {
        &[]
    }

    fn format(&self) -> OutputFormat;

    fn evaluate(&self, inputs: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue;
}

/// Values of a calculator's declared dependencies for the current pass.
pub struct ResolvedDependencies<'a> {
    values: BTreeMap<&'a str, &'a DerivedValue>,
}

impl<'a> ResolvedDependencies<'a> {
    pub(crate) fn new(values: BTreeMap<&'a str, &'a DerivedValue>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DerivedValue> {
        self.values.get(name).copied()
    }

    /// Numeric dependency value; anything non-numeric reads as zero.
    pub fn number(&self, name: &str) -> f64 {
        self.get(name)
            .and_then(DerivedValue::as_number)
            .map(finite_or_zero)
            .unwrap_or(0.0)
    }

    pub fn series(&self, name: &str) -> &[f64] {
        self.get(name)
            .and_then(DerivedValue::as_series)
            .unwrap_or(&[])
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(DerivedValue::as_text)
    }
}

type Formula = dyn Fn(&RawInputs, &ResolvedDependencies<'_>) -> DerivedValue + Send + Sync;

/// Closure-backed calculator for ad hoc registration.
pub struct FormulaFn {
    name: String,
    dependencies: Vec<&'static str>,
    format: OutputFormat,
    formula: Box<Formula>,
}

impl FormulaFn {
    pub fn new<F>(
        name: impl Into<String>,
        dependencies: &[&'static str],
        format: OutputFormat,
        formula: F,
    ) -> Self
    where
        F: Fn(&RawInputs, &ResolvedDependencies<'_>) -> DerivedValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.to_vec(),
            format,
            formula: Box::new(formula),
        }
    }
}

impl fmt::Debug for FormulaFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaFn")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Calculator for FormulaFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[&str] {
        &self.dependencies
    }

    fn format(&self) -> OutputFormat {
        self.format
    }

    fn evaluate(&self, inputs: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        (self.formula)(inputs, resolved)
    }
}

/// Developer-facing defects in the calculator graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationError {
    #[error("calculator '{name}' is registered more than once")]
    DuplicateCalculator { name: String },
    #[error("calculator '{calculator}' depends on unregistered calculator '{dependency}'")]
    UnknownDependency {
        calculator: String,
        dependency: String,
    },
    #[error("dependency cycle between {}", .members.join(", "))]
    DependencyCycle { members: Vec<String> },
    #[error("calculator '{calculator}' cannot resolve failed dependency '{dependency}'")]
    UpstreamFailure {
        calculator: String,
        dependency: String,
    },
}

/// Every configuration error found during validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid calculator registry: {}", render_errors(.0))]
pub struct ConfigurationErrors(pub Vec<ConfigurationError>);

fn render_errors(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Catalogue entry describing a registered calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculatorDescriptor {
    pub name: String,
    pub dependencies: Vec<String>,
    pub format: OutputFormat,
}

/// Fixed set of calculators, built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct FormulaRegistry {
    calculators: Vec<Box<dyn Calculator>>,
    index: HashMap<String, usize>,
}

impl FormulaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C>(&mut self, calculator: C) -> Result<(), ConfigurationError>
    where
        C: Calculator + 'static,
    {
        self.register_boxed(Box::new(calculator))
    }

    pub fn register_boxed(
        &mut self,
        calculator: Box<dyn Calculator>,
    ) -> Result<(), ConfigurationError> {
        let name = calculator.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ConfigurationError::DuplicateCalculator { name });
        }

        self.index.insert(name, self.calculators.len());
        self.calculators.push(calculator);
        Ok(())
    }

    pub fn with<C>(mut self, calculator: C) -> Result<Self, ConfigurationError>
    where
        C: Calculator + 'static,
    {
        self.register(calculator)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Calculator> {
        self.index
            .get(name)
            .map(|&position| self.calculators[position].as_ref())
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn calculators(&self) -> &[Box<dyn Calculator>] {
        &self.calculators
    }

    pub fn descriptors(&self) -> Vec<CalculatorDescriptor> {
        self.calculators
            .iter()
            .map(|calculator| CalculatorDescriptor {
                name: calculator.name().to_string(),
                dependencies: calculator
                    .dependencies()
                    .iter()
                    .map(|dependency| dependency.to_string())
                    .collect(),
                format: calculator.format(),
            })
            .collect()
    }

    /// Resolve evaluation order, isolating calculators that can never evaluate.
    pub fn plan(&self) -> EvaluationPlan {
        plan::build(self)
    }

    /// Returns every unknown dependency and cycle at once.
    ///
    /// Calculators that merely sit downstream of a broken one are not reported here;
    /// fixing the root causes clears them.
    pub fn validate(&self) -> Result<(), ConfigurationErrors> {
        let errors: Vec<ConfigurationError> = self
            .plan()
            .root_causes()
            .into_iter()
            .cloned()
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationErrors(errors))
        }
    }
}

impl fmt::Debug for FormulaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .calculators
            .iter()
            .map(|calculator| calculator.name())
            .collect();
        f.debug_struct("FormulaRegistry")
            .field("calculators", &names)
            .finish()
    }
}
