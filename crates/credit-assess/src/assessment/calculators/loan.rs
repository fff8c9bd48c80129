//! Repayment capacity: income, instalments, and leverage ratios.

use crate::assessment::domain::{DerivedValue, OutputFormat, RawInputs};
use crate::assessment::numeric::{finite_or_zero, safe_div};
use crate::assessment::registry::{Calculator, ResolvedDependencies};

pub const MONTHLY_INCOME: &str = "monthly_income";
pub const PROPOSED_EMI: &str = "proposed_emi";
pub const TOTAL_INTEREST_PAYABLE: &str = "total_interest_payable";
pub const EXISTING_EMI_OBLIGATIONS: &str = "existing_emi_obligations";
pub const TOTAL_MONTHLY_OBLIGATIONS: &str = "total_monthly_obligations";
pub const DEBT_BURDEN_RATIO: &str = "debt_burden_ratio";
pub const DEBT_SERVICE_COVERAGE_RATIO: &str = "debt_service_coverage_ratio";
pub const LOAN_TO_VALUE: &str = "loan_to_value";

pub const INCOME_BREAKDOWN: &[&str] = &[
    "income_salary",
    "income_business",
    "income_rental",
    "income_other",
];
pub const GROSS_MONTHLY_INCOME: &str = "gross_monthly_income";
pub const EXISTING_EMI_SLOTS: usize = 5;

/// Standard amortising instalment for `principal` over `months` at `monthly_rate`.
///
/// Zero when any of the three inputs is zero or negative. Terms long enough to
/// overflow the compounding factor converge on the interest-only payment.
pub fn emi(principal: f64, monthly_rate: f64, months: f64) -> f64 {
    if principal <= 0.0 || monthly_rate <= 0.0 || months <= 0.0 {
        return 0.0;
    }
    // P·r / (1 - (1+r)^-n)
    let discount = (1.0 + monthly_rate).powf(months).recip();
    finite_or_zero(safe_div(principal * monthly_rate, 1.0 - discount))
}

pub fn existing_emi_key(slot: usize) -> String {
    format!("existing_emi_{slot}")
}

/// Itemised income when any breakdown field is filled in, otherwise the single aggregate.
pub struct MonthlyIncome;

impl Calculator for MonthlyIncome {
    fn name(&self) -> &str {
        MONTHLY_INCOME
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        let itemised = INCOME_BREAKDOWN
            .iter()
            .any(|field| inputs.is_present(field));
        let income = if itemised {
            INCOME_BREAKDOWN.iter().map(|field| inputs.number(field)).sum()
        } else {
            inputs.number(GROSS_MONTHLY_INCOME)
        };
        DerivedValue::Number(income)
    }
}

/// Instalment on the requested loan. `interest_rate` is annual, in percent.
pub struct ProposedEmi;

impl Calculator for ProposedEmi {
    fn name(&self) -> &str {
        PROPOSED_EMI
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        let principal = inputs.number("loan_amount");
        let monthly_rate = inputs.number("interest_rate") / 12.0 / 100.0;
        let months = inputs.number("tenure_months");
        DerivedValue::Number(emi(principal, monthly_rate, months))
    }
}

pub struct TotalInterestPayable;

impl Calculator for TotalInterestPayable {
    fn name(&self) -> &str {
        TOTAL_INTEREST_PAYABLE
    }

    fn dependencies(&self) -> &[&str] {
        &[PROPOSED_EMI]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, inputs: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        let instalment = resolved.number(PROPOSED_EMI);
        if instalment == 0.0 {
            return DerivedValue::Number(0.0);
        }
        let repaid = instalment * inputs.number("tenure_months");
        DerivedValue::Number((repaid - inputs.number("loan_amount")).max(0.0))
    }
}

pub struct ExistingEmiObligations;

impl Calculator for ExistingEmiObligations {
    fn name(&self) -> &str {
        EXISTING_EMI_OBLIGATIONS
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(
            (1..=EXISTING_EMI_SLOTS)
                .map(|slot| inputs.number(&existing_emi_key(slot)))
                .sum(),
        )
    }
}

pub struct TotalMonthlyObligations;

impl Calculator for TotalMonthlyObligations {
    fn name(&self) -> &str {
        TOTAL_MONTHLY_OBLIGATIONS
    }

    fn dependencies(&self) -> &[&str] {
        &[PROPOSED_EMI, EXISTING_EMI_OBLIGATIONS]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(
            resolved.number(PROPOSED_EMI) + resolved.number(EXISTING_EMI_OBLIGATIONS),
        )
    }
}

/// Share of monthly income committed to instalments, in percent.
pub struct DebtBurdenRatio;

impl Calculator for DebtBurdenRatio {
    fn name(&self) -> &str {
        DEBT_BURDEN_RATIO
    }

    fn dependencies(&self) -> &[&str] {
        &[TOTAL_MONTHLY_OBLIGATIONS, MONTHLY_INCOME]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Percentage
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(
            safe_div(
                resolved.number(TOTAL_MONTHLY_OBLIGATIONS),
                resolved.number(MONTHLY_INCOME),
            ) * 100.0,
        )
    }
}

/// Annual net operating income over annual debt service.
pub struct DebtServiceCoverageRatio;

impl Calculator for DebtServiceCoverageRatio {
    fn name(&self) -> &str {
        DEBT_SERVICE_COVERAGE_RATIO
    }

    fn dependencies(&self) -> &[&str] {
        &[TOTAL_MONTHLY_OBLIGATIONS]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Ratio
    }

    fn evaluate(&self, inputs: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        let annual_debt_service = resolved.number(TOTAL_MONTHLY_OBLIGATIONS) * 12.0;
        DerivedValue::Number(safe_div(
            inputs.number("net_operating_income"),
            annual_debt_service,
        ))
    }
}

pub struct LoanToValue;

impl Calculator for LoanToValue {
    fn name(&self) -> &str {
        LOAN_TO_VALUE
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Percentage
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(
            safe_div(
                inputs.number("loan_amount"),
                inputs.number("collateral_value"),
            ) * 100.0,
        )
    }
}
