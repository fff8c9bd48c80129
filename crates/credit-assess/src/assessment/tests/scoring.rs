use super::common::*;
use crate::assessment::scoring::{Scorecard, Selections};

fn every_selection(card: &Scorecard) -> Vec<Selections> {
    card.parameters
        .iter()
        .fold(vec![Selections::new()], |partials, parameter| {
            partials
                .iter()
                .flat_map(|partial| {
                    parameter.options.iter().map(move |option| {
                        let mut next = partial.clone();
                        next.insert(parameter.name.clone(), option.label.clone());
                        next
                    })
                })
                .collect()
        })
}

#[test]
fn standard_scorecard_weights_reach_one_hundred() {
    let card = Scorecard::standard();

    assert_eq!(card.parameters.len(), 8);
    assert_eq!(card.max_score(), 100.0);
    assert_eq!(card.score(&strongest_selections()), 100.0);
    assert_eq!(card.classify(100.0).name, "Very Low Risk");
}

#[test]
fn every_combination_stays_within_bounds() {
    let card = Scorecard::standard();

    for selections in every_selection(&card) {
        let score = card.score(&selections);
        assert!((0.0..=100.0).contains(&score), "{score} out of range");
    }
}

#[test]
fn every_whole_score_is_classified() {
    let card = Scorecard::standard();

    for score in 0..=100 {
        let score = f64::from(score);
        let band = card.classify(score);
        assert_ne!(band.name, "Manual Review", "{score} fell into a gap");
        assert!(band.contains(score));
    }
}

#[test]
fn boundary_scores_land_in_the_expected_band() {
    let card = Scorecard::standard();

    assert_eq!(card.classify(45.0).name, "High Risk");
    assert_eq!(card.classify(46.0).name, "Elevated Risk");
    assert_eq!(card.classify(75.0).name, "Moderate Risk");
    assert_eq!(card.classify(76.0).name, "Low Risk");
    assert_eq!(card.classify(81.5).name, "Manual Review");
    assert_eq!(card.classify(82.0).name, "Very Low Risk");
}

#[test]
fn contributions_explain_the_composite() {
    let card = Scorecard::standard();
    let mut selections = strongest_selections();
    selections.insert("credit_bureau_score".to_string(), "700-749".to_string());
    selections.insert("industry_outlook".to_string(), "Booming".to_string());
    selections.remove("management_quality");

    let assessment = card.assess(&selections);

    // 100 - 20 × 0.2 - 10 - 5
    assert_eq!(assessment.score, 81.0);
    assert_eq!(assessment.band.name, "Low Risk");
    assert!(assessment.classified);

    let bureau = &assessment.contributions[0];
    assert_eq!(bureau.parameter, "credit_bureau_score");
    assert_eq!(bureau.points, 80.0);
    assert_close(bureau.contribution, 16.0);

    let outlook = assessment
        .contributions
        .iter()
        .find(|contribution| contribution.parameter == "industry_outlook")
        .expect("outlook contribution");
    assert!(!outlook.matched);
    assert_eq!(outlook.contribution, 0.0);

    let management = assessment
        .contributions
        .iter()
        .find(|contribution| contribution.parameter == "management_quality")
        .expect("management contribution");
    assert_eq!(management.selected, None);
}

#[test]
fn scorecard_round_trips_through_json_configuration() {
    let json = serde_json::to_string(&Scorecard::standard()).expect("serialises");

    let parsed: Scorecard = serde_json::from_str(&json).expect("parses");

    assert_eq!(parsed, Scorecard::standard());
}
