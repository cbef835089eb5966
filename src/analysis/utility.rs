/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Largest and smallest value of a slice. Returns `None` for empty input.
pub fn extremes(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(max, min), v| (max.max(*v), min.min(*v))),
    )
}

/// Rounds to `decimals` places, matching the one-decimal display precision
/// used in tables and exports.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_extremes() {
        assert_eq!(extremes(&[]), None);
        assert_eq!(extremes(&[3.0, -1.0, 7.5]), Some((7.5, -1.0)));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(87.46, 1), 87.5);
        assert_eq!(round_to(150.0, 1), 150.0);
        assert_eq!(round_to(0.04, 1), 0.0);
    }
}
