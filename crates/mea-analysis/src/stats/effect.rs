//! Effect sizes for pairwise comparisons.

use super::inference::{mean, sample_variance};

/// Cohen's d with pooled standard deviation.
///
/// `None` when either group has fewer than two values or the pooled
/// variance is zero, since the standardized difference is undefined there.
pub fn cohens_d(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let pooled_var =
        ((na - 1.0) * sample_variance(a) + (nb - 1.0) * sample_variance(b)) / (na + nb - 2.0);
    if pooled_var <= 0.0 {
        return None;
    }
    Some((mean(a) - mean(b)) / pooled_var.sqrt())
}

/// Rank-biserial correlation from a Mann-Whitney U statistic.
///
/// `r = 2*U1 / (n1*n2) - 1`, in [-1, 1]. Positive means the first group
/// tends to rank higher.
pub fn rank_biserial(u1: f64, n_a: usize, n_b: usize) -> Option<f64> {
    if n_a == 0 || n_b == 0 {
        return None;
    }
    Some(2.0 * u1 / (n_a as f64 * n_b as f64) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cohens_d_of_identical_groups_is_zero() {
        let g = [1.0, 2.0, 3.0];
        assert_eq!(cohens_d(&g, &g), Some(0.0));
    }

    #[test]
    fn cohens_d_sign_follows_first_group() {
        let lo = [1.0, 2.0, 3.0];
        let hi = [4.0, 5.0, 6.0];
        assert!(cohens_d(&hi, &lo).unwrap() > 0.0);
        assert!(cohens_d(&lo, &hi).unwrap() < 0.0);
    }

    #[test]
    fn cohens_d_undefined_for_constant_groups() {
        assert_eq!(cohens_d(&[2.0, 2.0], &[5.0, 5.0]), None);
    }

    #[test]
    fn cohens_d_undefined_for_tiny_groups() {
        assert_eq!(cohens_d(&[1.0], &[2.0, 3.0]), None);
    }

    #[test]
    fn rank_biserial_extremes() {
        // Complete separation: U1 = n1*n2 or 0.
        assert_eq!(rank_biserial(12.0, 3, 4), Some(1.0));
        assert_eq!(rank_biserial(0.0, 3, 4), Some(-1.0));
        assert_eq!(rank_biserial(6.0, 3, 4), Some(0.0));
    }
}
