use super::{RiskBand, ScoreOption, ScoringParameter, Scorecard};

fn parameter(name: &str, weight: f64, options: &[(&str, f64)]) -> ScoringParameter {
    ScoringParameter::new(
        name,
        weight,
        options
            .iter()
            .map(|(label, points)| ScoreOption::new(*label, *points))
            .collect(),
    )
}

pub(super) fn standard_scorecard() -> Scorecard {
    let parameters = vec![
        parameter(
            "credit_bureau_score",
            20.0,
            &[
                ("750 and above", 100.0),
                ("700-749", 80.0),
                ("650-699", 60.0),
                ("600-649", 35.0),
                ("Below 600", 10.0),
                ("No history", 40.0),
            ],
        ),
        parameter(
            "repayment_track_record",
            15.0,
            &[
                ("No delays", 100.0),
                ("Occasional delays under 30 days", 60.0),
                ("Delays of 30-90 days", 25.0),
                ("Defaults or write-offs", 0.0),
            ],
        ),
        parameter(
            "years_in_business",
            10.0,
            &[
                ("More than 10 years", 100.0),
                ("5-10 years", 75.0),
                ("3-5 years", 50.0),
                ("Less than 3 years", 20.0),
            ],
        ),
        parameter(
            "debt_burden",
            15.0,
            &[
                ("Below 30%", 100.0),
                ("30-40%", 75.0),
                ("40-50%", 45.0),
                ("Above 50%", 10.0),
            ],
        ),
        parameter(
            "collateral_coverage",
            15.0,
            &[
                ("Above 150%", 100.0),
                ("125-150%", 80.0),
                ("100-125%", 55.0),
                ("Below 100%", 20.0),
                ("Unsecured", 0.0),
            ],
        ),
        parameter(
            "cash_flow_stability",
            10.0,
            &[
                ("Stable", 100.0),
                ("Moderately stable", 65.0),
                ("Volatile", 25.0),
            ],
        ),
        parameter(
            "industry_outlook",
            10.0,
            &[("Positive", 100.0), ("Neutral", 60.0), ("Negative", 20.0)],
        ),
        parameter(
            "management_quality",
            5.0,
            &[("Strong", 100.0), ("Adequate", 60.0), ("Weak", 15.0)],
        ),
    ];

    let bands = vec![
        RiskBand::new(
            "Very Low Risk",
            82.0,
            100.0,
            "#1b5e20",
            "Strong profile; eligible for standard pricing",
        ),
        RiskBand::new(
            "Low Risk",
            76.0,
            81.0,
            "#43a047",
            "Acceptable profile with minor weaknesses",
        ),
        RiskBand::new(
            "Moderate Risk",
            61.0,
            75.0,
            "#f9a825",
            "Approve with covenants or additional security",
        ),
        RiskBand::new(
            "Elevated Risk",
            46.0,
            60.0,
            "#ef6c00",
            "Requires senior credit approval",
        ),
        RiskBand::new(
            "High Risk",
            0.0,
            45.0,
            "#c62828",
            "Outside risk appetite",
        ),
    ];

    let default_band = RiskBand::new(
        "Manual Review",
        0.0,
        100.0,
        "#757575",
        "Score falls between configured bands; refer to a credit officer",
    );

    Scorecard::new(parameters, bands, default_band)
}
