use super::Scorecard;

const WEIGHT_TOTAL: f64 = 100.0;
const TOLERANCE: f64 = 1e-6;

/// Validate a scorecard at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scorecard(scorecard: &Scorecard) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if scorecard.parameters.is_empty() {
        errors.push("scorecard.parameters: at least one parameter is required".to_string());
    }

    for (i, parameter) in scorecard.parameters.iter().enumerate() {
        if !(0.0..=WEIGHT_TOTAL).contains(&parameter.weight) {
            errors.push(format!(
                "scorecard.parameters[{}].weight: '{}' must be within 0-100",
                i, parameter.weight
            ));
        }

        if parameter.options.is_empty() {
            errors.push(format!(
                "scorecard.parameters[{}].options: '{}' has no options",
                i, parameter.name
            ));
        }

        for (j, option) in parameter.options.iter().enumerate() {
            if !(0.0..=100.0).contains(&option.points) {
                errors.push(format!(
                    "scorecard.parameters[{}].options[{}].points: '{}' must be within 0-100",
                    i, j, option.points
                ));
            }
        }

        if scorecard.parameters[..i]
            .iter()
            .any(|earlier| earlier.name == parameter.name)
        {
            errors.push(format!(
                "scorecard.parameters[{}].name: '{}' is declared more than once",
                i, parameter.name
            ));
        }
    }

    let total_weight: f64 = scorecard
        .parameters
        .iter()
        .map(|parameter| parameter.weight)
        .sum();
    if !scorecard.parameters.is_empty() && (total_weight - WEIGHT_TOTAL).abs() > TOLERANCE {
        errors.push(format!(
            "scorecard.parameters: weights sum to {}, expected 100",
            total_weight
        ));
    }

    for (i, band) in scorecard.bands.iter().enumerate() {
        if band.min > band.max {
            errors.push(format!(
                "scorecard.bands[{}]: '{}' has min {} above max {}",
                i, band.name, band.min, band.max
            ));
        }

        if band.min < 0.0 || band.max > 100.0 {
            errors.push(format!(
                "scorecard.bands[{}]: '{}' must stay within 0-100",
                i, band.name
            ));
        }

        for (j, other) in scorecard.bands.iter().enumerate().skip(i + 1) {
            if band.min <= other.max && other.min <= band.max {
                errors.push(format!(
                    "scorecard.bands[{}]: '{}' overlaps bands[{}] '{}'",
                    i, band.name, j, other.name
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
