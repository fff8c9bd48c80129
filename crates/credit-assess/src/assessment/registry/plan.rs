//! Evaluation ordering over the declared dependency graph.
//!
//! Edges run from a calculator to each calculator it depends on. Tarjan's SCC pass yields
//! components in reverse topological order, so dependencies always precede dependents and
//! any component with more than one member (or a self-edge) is a cycle.

use std::collections::BTreeSet;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{ConfigurationError, FormulaRegistry};

/// Calculator excluded from evaluation, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedCalculator {
    pub position: usize,
    pub name: String,
    pub error: ConfigurationError,
}

impl BlockedCalculator {
    fn is_root_cause(&self) -> bool {
        !matches!(self.error, ConfigurationError::UpstreamFailure { .. })
    }
}

/// Order in which satisfiable calculators run, plus every calculator that cannot run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationPlan {
    order: Vec<usize>,
    blocked: Vec<BlockedCalculator>,
}

impl EvaluationPlan {
    /// Registry positions in evaluation order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn blocked(&self) -> &[BlockedCalculator] {
        &self.blocked
    }

    pub fn is_complete(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Distinct unknown-dependency and cycle errors, one per cycle.
    pub fn root_causes(&self) -> Vec<&ConfigurationError> {
        let mut seen = Vec::new();
        for blocked in self.blocked.iter().filter(|blocked| blocked.is_root_cause()) {
            if !seen.contains(&&blocked.error) {
                seen.push(&blocked.error);
            }
        }
        seen
    }
}

enum Status {
    Pending,
    Ready,
    Blocked,
}

pub(super) fn build(registry: &FormulaRegistry) -> EvaluationPlan {
    let calculators = registry.calculators();
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(calculators.len(), 0);
    for position in 0..calculators.len() {
        graph.add_node(position);
    }

    for (position, calculator) in calculators.iter().enumerate() {
        for dependency in calculator.dependencies() {
            if let Some(target) = registry.position(dependency) {
                graph.add_edge(NodeIndex::new(position), NodeIndex::new(target), ());
            }
        }
    }

    let mut status: Vec<Status> = calculators.iter().map(|_| Status::Pending).collect();
    let mut plan = EvaluationPlan::default();

    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .map(|node| graph.contains_edge(*node, *node))
                .unwrap_or(false);

        if cyclic {
            let members: BTreeSet<String> = component
                .iter()
                .map(|node| calculators[graph[*node]].name().to_string())
                .collect();
            let members: Vec<String> = members.into_iter().collect();

            let mut positions: Vec<usize> = component.iter().map(|node| graph[*node]).collect();
            positions.sort_unstable();
            for position in positions {
                status[position] = Status::Blocked;
                plan.blocked.push(BlockedCalculator {
                    position,
                    name: calculators[position].name().to_string(),
                    error: ConfigurationError::DependencyCycle {
                        members: members.clone(),
                    },
                });
            }
            continue;
        }

        for node in component {
            let position = graph[node];
            let calculator = &calculators[position];
            let mut error = None;

            for dependency in calculator.dependencies() {
                match registry.position(dependency) {
                    None => {
                        error = Some(ConfigurationError::UnknownDependency {
                            calculator: calculator.name().to_string(),
                            dependency: dependency.to_string(),
                        });
                        break;
                    }
                    Some(target) => {
                        if !matches!(status[target], Status::Ready) {
                            error.get_or_insert(ConfigurationError::UpstreamFailure {
                                calculator: calculator.name().to_string(),
                                dependency: dependency.to_string(),
                            });
                        }
                    }
                }
            }

            match error {
                Some(error) => {
                    status[position] = Status::Blocked;
                    plan.blocked.push(BlockedCalculator {
                        position,
                        name: calculator.name().to_string(),
                        error,
                    });
                }
                None => {
                    status[position] = Status::Ready;
                    plan.order.push(position);
                }
            }
        }
    }

    plan.blocked.sort_by_key(|blocked| blocked.position);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::domain::{DerivedValue, OutputFormat};
    use crate::assessment::registry::FormulaFn;

    fn node(name: &'static str, deps: &[&'static str]) -> FormulaFn {
        FormulaFn::new(name, deps, OutputFormat::Raw, |_, _| DerivedValue::Number(0.0))
    }

    fn registry(nodes: Vec<FormulaFn>) -> FormulaRegistry {
        let mut registry = FormulaRegistry::new();
        for calculator in nodes {
            registry.register(calculator).expect("unique names");
        }
        registry
    }

    fn names(registry: &FormulaRegistry, plan: &EvaluationPlan) -> Vec<String> {
        plan.order()
            .iter()
            .map(|position| registry.calculators()[*position].name().to_string())
            .collect()
    }

    #[test]
    fn dependencies_precede_dependents() {
        let registry = registry(vec![
            node("cycle_days", &["debtor_days", "creditor_days"]),
            node("creditor_days", &[]),
            node("debtor_days", &[]),
            node("report", &["cycle_days", "debtor_days"]),
        ]);

        let plan = registry.plan();
        let order = names(&registry, &plan);

        assert!(plan.is_complete());
        let at = |name: &str| order.iter().position(|entry| entry == name).expect("planned");
        assert!(at("debtor_days") < at("cycle_days"));
        assert!(at("creditor_days") < at("cycle_days"));
        assert!(at("cycle_days") < at("report"));
    }

    #[test]
    fn cycles_block_members_and_dependents_only() {
        let registry = registry(vec![
            node("x", &["y"]),
            node("y", &["x"]),
            node("z", &["x"]),
            node("free", &[]),
        ]);

        let plan = registry.plan();

        assert_eq!(names(&registry, &plan), vec!["free".to_string()]);
        assert_eq!(plan.blocked().len(), 3);
        let cycle = ConfigurationError::DependencyCycle {
            members: vec!["x".to_string(), "y".to_string()],
        };
        assert_eq!(plan.blocked()[0].error, cycle);
        assert_eq!(plan.blocked()[1].error, cycle);
        assert_eq!(
            plan.blocked()[2].error,
            ConfigurationError::UpstreamFailure {
                calculator: "z".to_string(),
                dependency: "x".to_string(),
            }
        );
        assert_eq!(plan.root_causes(), vec![&cycle]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let registry = registry(vec![node("loop", &["loop"])]);

        let plan = registry.plan();

        assert!(plan.order().is_empty());
        assert_eq!(
            plan.blocked()[0].error,
            ConfigurationError::DependencyCycle {
                members: vec!["loop".to_string()],
            }
        );
    }

    #[test]
    fn unknown_dependency_blocks_calculator() {
        let registry = registry(vec![node("ratio", &["missing"]), node("ok", &[])]);

        let plan = registry.plan();

        assert_eq!(names(&registry, &plan), vec!["ok".to_string()]);
        assert_eq!(
            plan.blocked()[0].error,
            ConfigurationError::UnknownDependency {
                calculator: "ratio".to_string(),
                dependency: "missing".to_string(),
            }
        );
    }
}
