//! Built-in calculator catalogue.

pub mod cash_flow;
pub mod deviations;
pub mod financials;
pub mod loan;
pub mod ratios;

pub use deviations::{DeviationCode, PolicyThresholds, NO_DEVIATION, POLICY_DEVIATIONS};

use super::registry::{ConfigurationError, FormulaRegistry};
use cash_flow::{
    AnnualTotal, CashFlowStabilityScore, CreditConcentration, CreditTrend, CreditVolatilityIndex,
    MonthlyAverage, MonthlySeries, NetMonthlySurplus,
};
use deviations::PolicyDeviations;
use financials::{AverageNetProfitMargin, RevenueGrowth};
use loan::{
    DebtBurdenRatio, DebtServiceCoverageRatio, ExistingEmiObligations, LoanToValue,
    MonthlyIncome, ProposedEmi, TotalInterestPayable, TotalMonthlyObligations,
};
use ratios::{CashConversionCycle, FieldRatio, FieldSum, NetWorth};

/// Registry holding every built-in calculator, configured with `policy`.
pub fn standard_registry(policy: &PolicyThresholds) -> Result<FormulaRegistry, ConfigurationError> {
    let mut registry = FormulaRegistry::new();

    registry.register(MonthlySeries::credits())?;
    registry.register(MonthlySeries::debits())?;
    registry.register(AnnualTotal::credits())?;
    registry.register(AnnualTotal::debits())?;
    registry.register(MonthlyAverage::credits())?;
    registry.register(MonthlyAverage::debits())?;
    registry.register(NetMonthlySurplus)?;
    registry.register(CreditVolatilityIndex)?;
    registry.register(CreditTrend)?;
    registry.register(CreditConcentration)?;
    registry.register(CashFlowStabilityScore)?;

    registry.register(FieldRatio::current_ratio())?;
    registry.register(FieldRatio::debtor_days())?;
    registry.register(FieldRatio::inventory_days())?;
    registry.register(FieldRatio::creditor_days())?;
    registry.register(CashConversionCycle)?;
    registry.register(FieldSum::total_assets())?;
    registry.register(FieldSum::total_liabilities())?;
    registry.register(NetWorth)?;

    registry.register(MonthlyIncome)?;
    registry.register(ProposedEmi)?;
    registry.register(TotalInterestPayable)?;
    registry.register(ExistingEmiObligations)?;
    registry.register(TotalMonthlyObligations)?;
    registry.register(DebtBurdenRatio)?;
    registry.register(DebtServiceCoverageRatio)?;
    registry.register(LoanToValue)?;

    registry.register(RevenueGrowth)?;
    registry.register(AverageNetProfitMargin)?;

    registry.register(PolicyDeviations::new(policy.clone()))?;

    Ok(registry)
}
