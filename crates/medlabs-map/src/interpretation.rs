use medlabs_model::{Interpretation, NormalizedObservation};

/// Reads a numeric value against its reference bounds.
///
/// Values on a bound count as normal. Non-numeric values and numeric values
/// without any bound are `Unknown`.
pub fn interpret(observation: &NormalizedObservation) -> Interpretation {
    let Some(value) = observation.value.as_number() else {
        return Interpretation::Unknown;
    };

    match (observation.ref_low, observation.ref_high) {
        (Some(low), _) if value < low => Interpretation::Low,
        (_, Some(high)) if value > high => Interpretation::High,
        (None, None) => Interpretation::Unknown,
        _ => Interpretation::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(value: f64, low: Option<f64>, high: Option<f64>) -> NormalizedObservation {
        NormalizedObservation::new("wbc", value).with_range(low, high)
    }

    #[test]
    fn interpret_against_both_bounds() {
        assert_eq!(interpret(&observation(3.9, Some(4.0), Some(10.0))), Interpretation::Low);
        assert_eq!(interpret(&observation(4.0, Some(4.0), Some(10.0))), Interpretation::Normal);
        assert_eq!(interpret(&observation(10.5, Some(4.0), Some(10.0))), Interpretation::High);
    }

    #[test]
    fn interpret_single_bound() {
        assert_eq!(interpret(&observation(2.0, None, Some(5.0))), Interpretation::Normal);
        assert_eq!(interpret(&observation(6.0, None, Some(5.0))), Interpretation::High);
        assert_eq!(interpret(&observation(6.0, Some(5.0), None)), Interpretation::Normal);
    }

    #[test]
    fn interpret_unknown_cases() {
        assert_eq!(interpret(&observation(6.0, None, None)), Interpretation::Unknown);
        let text = NormalizedObservation::new("nitrite", "negative").with_range(Some(0.0), Some(1.0));
        assert_eq!(interpret(&text), Interpretation::Unknown);
    }
}
