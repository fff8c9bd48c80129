//! Multi-year statement trends keyed as `<entity>_fy<year>`, year 1 oldest.

use crate::assessment::domain::{DerivedValue, OutputFormat, RawInputs};
use crate::assessment::numeric::{mean, safe_div};
use crate::assessment::registry::{Calculator, ResolvedDependencies};

pub const FINANCIAL_YEARS: usize = 3;

pub const REVENUE_GROWTH: &str = "revenue_growth";
pub const AVERAGE_NET_PROFIT_MARGIN: &str = "average_net_profit_margin";

pub fn year_key(entity: &str, year: usize) -> String {
    format!("{entity}_fy{year}")
}

/// Latest year's net sales against the prior year, in percent.
pub struct RevenueGrowth;

impl Calculator for RevenueGrowth {
    fn name(&self) -> &str {
        REVENUE_GROWTH
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Percentage
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        let latest = inputs.number(&year_key("net_sales", FINANCIAL_YEARS));
        let prior = inputs.number(&year_key("net_sales", FINANCIAL_YEARS - 1));
        DerivedValue::Number(safe_div(latest - prior, prior) * 100.0)
    }
}

/// Mean net margin over the years that reported sales.
pub struct AverageNetProfitMargin;

impl Calculator for AverageNetProfitMargin {
    fn name(&self) -> &str {
        AVERAGE_NET_PROFIT_MARGIN
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Percentage
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        let margins: Vec<f64> = (1..=FINANCIAL_YEARS)
            .filter_map(|year| {
                let sales = inputs.number(&year_key("net_sales", year));
                (sales > 0.0).then(|| {
                    safe_div(inputs.number(&year_key("net_profit", year)), sales) * 100.0
                })
            })
            .collect();
        DerivedValue::Number(mean(&margins))
    }
}
