use crate::constants::HESSIAN_EPS;
use crate::errors::UpliftError;
use std::convert::TryInto;

/// Create a string of all available items.
pub fn items_to_strings(items: &[&str]) -> String {
    items.join(", ")
}

// Validation
pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), UpliftError> {
    validate_float_parameter(value, f64::MIN_POSITIVE, f64::INFINITY, parameter)
}

pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), UpliftError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(UpliftError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Convert Log odds to probability
#[inline]
pub fn odds(v: f64) -> f64 {
    1. / (1. + (-v).exp())
}

/// Calculate the weight of a given node, given the sum
/// of the gradients, and the hessians in a node.
#[inline]
pub fn weight(gradient_sum: f32, hessian_sum: f32, lambda: f32) -> f32 {
    -gradient_sum / (hessian_sum + lambda + HESSIAN_EPS)
}

/// Calculate the gain given the gradient and hessian of the node.
#[inline]
pub fn gain(gradient_sum: f32, hessian_sum: f32, lambda: f32) -> f32 {
    (gradient_sum * gradient_sum) / (hessian_sum + lambda + HESSIAN_EPS) // no -0.5 multiplier term!
}

const LANES: usize = 16;

/// Fast summation, ends up being roughly 8 to 10 times faster
/// than values.iter().copied().sum().
#[inline]
pub fn fast_sum(values: &[f64]) -> f64 {
    let chunks = values.chunks_exact(LANES);
    let remainder = chunks.remainder();

    let sum = chunks.fold([0.0_f64; LANES], |mut acc, chunk| {
        let chunk: [f64; LANES] = chunk.try_into().unwrap();
        for i in 0..LANES {
            acc[i] += chunk[i];
        }
        acc
    });

    let remainder: f64 = remainder.iter().copied().sum();
    sum.iter().sum::<f64>() + remainder
}

/// Sum `f32` statistics using `f64` as the internal representation so that
/// we don't lose precision on large nodes.
#[inline]
pub fn fast_f64_sum(values: &[f32]) -> f32 {
    values.iter().fold(0.0_f64, |acc, v| acc + f64::from(*v)) as f32
}

/// Naive percentiles calculation over an unweighted, non-missing vector.
///
/// * `v` - A Vector of which to find percentiles for.
/// * `percentiles` - Percentiles to look for in the data. This should be
///   values from 0 to 1, and in sorted order.
pub fn percentiles(v: &[f64], percentiles: &[f64]) -> Vec<f64> {
    if v.is_empty() {
        return Vec::new();
    }
    let mut sorted = v.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let last = sorted.len() - 1;
    percentiles
        .iter()
        .map(|p| {
            let pos = (p.clamp(0.0, 1.0) * last as f64).floor() as usize;
            sorted[pos.min(last)]
        })
        .collect()
}

/// Return the index of the first value in a sorted
/// vector that is greater than a provided value.
///
/// * `x` - The sorted slice of values.
/// * `v` - The value used to calculate the first
///   value larger than it.
#[inline]
pub fn map_bin(x: &[f64], v: f64) -> Option<u16> {
    let mut low = 0;
    let mut high = x.len();
    while low != high {
        let mid = (low + high) / 2;
        // This will always be false for NaNs,
        // forcing them to the bottom bin.
        if x[mid] <= v {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    u16::try_from(low).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_bin() {
        let cuts = vec![1.0, 5.0, 10.0, f64::MAX];
        assert_eq!(map_bin(&cuts, 0.5), Some(0));
        assert_eq!(map_bin(&cuts, 1.0), Some(1));
        assert_eq!(map_bin(&cuts, 4.9), Some(1));
        assert_eq!(map_bin(&cuts, 5.0), Some(2));
        assert_eq!(map_bin(&cuts, 100.0), Some(3));
        assert_eq!(map_bin(&cuts, f64::NAN), Some(0));
    }

    #[test]
    fn test_percentiles() {
        let v: Vec<f64> = (0..101).map(f64::from).rev().collect();
        let p = percentiles(&v, &[0.0, 0.25, 0.5, 1.0]);
        assert_eq!(p, vec![0.0, 25.0, 50.0, 100.0]);
        assert!(percentiles(&[], &[0.5]).is_empty());
    }

    #[test]
    fn test_fast_sum() {
        let v: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        assert_eq!(fast_sum(&v), 499500.0);
        let w = vec![0.5_f32; 33];
        assert!((fast_f64_sum(&w) - 16.5).abs() < 1e-6);
    }

    #[test]
    fn test_validate_float_parameter() {
        assert!(validate_float_parameter(0.5, 0.0, 1.0, "p").is_ok());
        assert!(validate_float_parameter(1.5, 0.0, 1.0, "p").is_err());
        assert!(validate_float_parameter(f64::NAN, 0.0, 1.0, "p").is_err());
        assert!(validate_positive_float_parameter(0.0, "eta").is_err());
    }

    #[test]
    fn test_odds_and_weight() {
        assert!((odds(0.0) - 0.5).abs() < 1e-12);
        assert!(odds(50.0) <= 1.0);
        assert!(weight(2.0, 1.0, 1.0) < 0.0);
        assert!(gain(2.0, 1.0, 1.0) > 0.0);
    }
}
