//! Test statistics and p-values via `statrs` distributions.
//!
//! Each test returns `(statistic, two-sided p-value)`. Degenerate inputs
//! (zero variance, all-tied ranks) yield p = 1 when the groups are
//! indistinguishable; distribution construction failures yield p = NaN
//! rather than a silent wrong answer.

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};

pub(crate) fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample variance (ddof = 1). Zero for fewer than two values.
pub(crate) fn sample_variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64
}

/// Median of unsorted values.
pub(crate) fn median(xs: &[f64]) -> f64 {
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn two_sided_from_t(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Welch's t-test (unequal variances). Requires n >= 2 per group.
pub fn welch_t(a: &[f64], b: &[f64]) -> (f64, f64) {
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (va, vb) = (sample_variance(a), sample_variance(b));
    let se2 = va / na + vb / nb;
    let diff = mean(a) - mean(b);

    if se2 <= 0.0 {
        // Both groups constant: identical means are a perfect null.
        return if diff == 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY * diff.signum(), 0.0)
        };
    }

    let t = diff / se2.sqrt();
    let df = se2.powi(2)
        / ((va / na).powi(2) / (na - 1.0) + (vb / nb).powi(2) / (nb - 1.0));
    (t, two_sided_from_t(t, df))
}

/// One-way ANOVA across k groups. Requires n >= 2 per group.
pub fn one_way_anova(groups: &[&[f64]]) -> (f64, f64) {
    let k = groups.len();
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let grand_mean =
        groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n_total as f64;

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|x| (x - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df1 = (k - 1) as f64;
    let df2 = (n_total - k) as f64;
    if ss_within <= 0.0 {
        return if ss_between <= 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY, 0.0)
        };
    }

    let f = (ss_between / df1) / (ss_within / df2);
    match FisherSnedecor::new(df1, df2) {
        Ok(dist) => (f, (1.0 - dist.cdf(f)).clamp(0.0, 1.0)),
        Err(_) => (f, f64::NAN),
    }
}

/// Average ranks (1-based, ties averaged) over pooled values, plus the tie
/// correction term `sum(t^3 - t)` over tie groups.
pub(crate) fn average_ranks(pooled: &[f64]) -> (Vec<f64>, f64) {
    let n = pooled.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        pooled[a]
            .partial_cmp(&pooled[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; n];
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && pooled[order[j + 1]] == pooled[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j + 2) as f64 / 2.0; // 1-based average over the tied span
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        let t = (j - i + 1) as f64;
        tie_term += t.powi(3) - t;
        i = j + 1;
    }
    (ranks, tie_term)
}

/// Mann-Whitney U, two-sided, normal approximation with tie correction and
/// continuity correction. Returns (U of the first group, p).
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> (f64, f64) {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let n = n1 + n2;

    let pooled: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    let (ranks, tie_term) = average_ranks(&pooled);

    let r1: f64 = ranks[..a.len()].iter().sum();
    let u1 = r1 - n1 * (n1 + 1.0) / 2.0;

    let mu = n1 * n2 / 2.0;
    let sigma2 = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if sigma2 <= 0.0 {
        // Every value tied: no evidence of a difference.
        return (u1, 1.0);
    }

    let diff = u1 - mu;
    let z = (diff - 0.5 * diff.signum()) / sigma2.sqrt();
    match Normal::new(0.0, 1.0) {
        Ok(dist) => (u1, (2.0 * (1.0 - dist.cdf(z.abs()))).clamp(0.0, 1.0)),
        Err(_) => (u1, f64::NAN),
    }
}

/// Kruskal-Wallis H across k groups, tie-corrected, chi-squared p-value.
pub fn kruskal_wallis(groups: &[&[f64]]) -> (f64, f64) {
    let k = groups.len();
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let n = n_total as f64;

    let pooled: Vec<f64> = groups.iter().flat_map(|g| g.iter()).copied().collect();
    let (ranks, tie_term) = average_ranks(&pooled);

    let mut h = 0.0;
    let mut offset = 0;
    for g in groups {
        let r: f64 = ranks[offset..offset + g.len()].iter().sum();
        h += r * r / g.len() as f64;
        offset += g.len();
    }
    h = 12.0 / (n * (n + 1.0)) * h - 3.0 * (n + 1.0);

    let correction = 1.0 - tie_term / (n.powi(3) - n);
    if correction <= 0.0 {
        return (0.0, 1.0);
    }
    h /= correction;

    match ChiSquared::new((k - 1) as f64) {
        Ok(dist) => (h, (1.0 - dist.cdf(h)).clamp(0.0, 1.0)),
        Err(_) => (h, f64::NAN),
    }
}

/// Jarque-Bera normality test: JB = n/6 * (S^2 + K^2/4), chi-squared df 2.
///
/// Weak for small n; callers gate on a minimum sample size.
pub fn jarque_bera(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    if xs.len() < 3 {
        return (0.0, 1.0);
    }
    let m = mean(xs);
    let m2 = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
    if m2 <= 0.0 {
        return (0.0, 1.0);
    }
    let m3 = xs.iter().map(|x| (x - m).powi(3)).sum::<f64>() / n;
    let m4 = xs.iter().map(|x| (x - m).powi(4)).sum::<f64>() / n;

    let skew = m3 / m2.powf(1.5);
    let excess_kurtosis = m4 / (m2 * m2) - 3.0;
    let jb = n / 6.0 * (skew.powi(2) + excess_kurtosis.powi(2) / 4.0);

    match ChiSquared::new(2.0) {
        Ok(dist) => (jb, (1.0 - dist.cdf(jb)).clamp(0.0, 1.0)),
        Err(_) => (jb, f64::NAN),
    }
}
