//! Working-capital ratios and balance-sheet aggregates.

use crate::assessment::domain::{DerivedValue, OutputFormat, RawInputs};
use crate::assessment::numeric::safe_div;
use crate::assessment::registry::{Calculator, ResolvedDependencies};

pub const CURRENT_RATIO: &str = "current_ratio";
pub const DEBTOR_DAYS: &str = "debtor_days";
pub const INVENTORY_DAYS: &str = "inventory_days";
pub const CREDITOR_DAYS: &str = "creditor_days";
pub const CASH_CONVERSION_CYCLE: &str = "cash_conversion_cycle";
pub const TOTAL_ASSETS: &str = "total_assets";
pub const TOTAL_LIABILITIES: &str = "total_liabilities";
pub const NET_WORTH: &str = "net_worth";

pub const ASSET_LINE_ITEMS: &[&str] = &[
    "cash_and_bank",
    "fixed_deposits",
    "investments",
    "property_value",
    "vehicle_value",
    "other_assets",
];

pub const LIABILITY_LINE_ITEMS: &[&str] =
    &["outstanding_loans", "credit_card_dues", "other_liabilities"];

const DAYS_IN_YEAR: f64 = 365.0;

/// `numerator × multiplier / denominator` over two raw fields; zero when the denominator is.
pub struct FieldRatio {
    name: &'static str,
    numerator: &'static str,
    denominator: &'static str,
    multiplier: f64,
    format: OutputFormat,
}

impl FieldRatio {
    pub const fn new(
        name: &'static str,
        numerator: &'static str,
        denominator: &'static str,
        multiplier: f64,
        format: OutputFormat,
    ) -> Self {
        Self {
            name,
            numerator,
            denominator,
            multiplier,
            format,
        }
    }

    pub const fn current_ratio() -> Self {
        Self::new(
            CURRENT_RATIO,
            "current_assets",
            "current_liabilities",
            1.0,
            OutputFormat::Ratio,
        )
    }

    pub const fn debtor_days() -> Self {
        Self::new(
            DEBTOR_DAYS,
            "trade_debtors",
            "annual_sales",
            DAYS_IN_YEAR,
            OutputFormat::Ratio,
        )
    }

    pub const fn inventory_days() -> Self {
        Self::new(
            INVENTORY_DAYS,
            "inventory",
            "cost_of_goods_sold",
            DAYS_IN_YEAR,
            OutputFormat::Ratio,
        )
    }

    pub const fn creditor_days() -> Self {
        Self::new(
            CREDITOR_DAYS,
            "trade_creditors",
            "annual_purchases",
            DAYS_IN_YEAR,
            OutputFormat::Ratio,
        )
    }
}

impl Calculator for FieldRatio {
    fn name(&self) -> &str {
        self.name
    }

    fn format(&self) -> OutputFormat {
        self.format
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        let numerator = inputs.number(self.numerator) * self.multiplier;
        DerivedValue::Number(safe_div(numerator, inputs.number(self.denominator)))
    }
}

/// Debtor days + inventory days − creditor days.
pub struct CashConversionCycle;

impl Calculator for CashConversionCycle {
    fn name(&self) -> &str {
        CASH_CONVERSION_CYCLE
    }

    fn dependencies(&self) -> &[&str] {
        &[DEBTOR_DAYS, INVENTORY_DAYS, CREDITOR_DAYS]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Ratio
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(
            resolved.number(DEBTOR_DAYS) + resolved.number(INVENTORY_DAYS)
                - resolved.number(CREDITOR_DAYS),
        )
    }
}

/// Sum of a fixed list of raw line items.
pub struct FieldSum {
    name: &'static str,
    fields: &'static [&'static str],
}

impl FieldSum {
    pub const fn total_assets() -> Self {
        Self {
            name: TOTAL_ASSETS,
            fields: ASSET_LINE_ITEMS,
        }
    }

    pub const fn total_liabilities() -> Self {
        Self {
            name: TOTAL_LIABILITIES,
            fields: LIABILITY_LINE_ITEMS,
        }
    }
}

impl Calculator for FieldSum {
    fn name(&self) -> &str {
        self.name
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(self.fields.iter().map(|field| inputs.number(field)).sum())
    }
}

pub struct NetWorth;

impl Calculator for NetWorth {
    fn name(&self) -> &str {
        NET_WORTH
    }

    fn dependencies(&self) -> &[&str] {
        &[TOTAL_ASSETS, TOTAL_LIABILITIES]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(resolved.number(TOTAL_ASSETS) - resolved.number(TOTAL_LIABILITIES))
    }
}
