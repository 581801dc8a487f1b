//! Multiple-comparison p-value adjustment.

use mea_core::config::PAdjustMethod;

/// Adjust p-values for multiple comparisons.
///
/// - Bonferroni: `p * m`, capped at 1
/// - Holm: step-down Bonferroni with enforced monotonicity
/// - FDR (Benjamini-Hochberg): step-up, controls false discovery rate
pub fn p_adjust(pvals: &[f64], method: PAdjustMethod) -> Vec<f64> {
    let m = pvals.len();
    if m == 0 {
        return Vec::new();
    }

    match method {
        PAdjustMethod::Bonferroni => pvals.iter().map(|p| (p * m as f64).min(1.0)).collect(),

        PAdjustMethod::Holm => {
            let mut order: Vec<usize> = (0..m).collect();
            order.sort_by(|&a, &b| {
                pvals[a]
                    .partial_cmp(&pvals[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let mut adj_ranked = vec![0.0; m];
            for (i, &idx) in order.iter().enumerate() {
                adj_ranked[i] = ((m - i) as f64 * pvals[idx]).min(1.0);
            }
            for i in 1..m {
                adj_ranked[i] = adj_ranked[i].max(adj_ranked[i - 1]);
            }
            let mut out = vec![0.0; m];
            for (i, &idx) in order.iter().enumerate() {
                out[idx] = adj_ranked[i];
            }
            out
        }

        PAdjustMethod::FdrBh => {
            let mut order: Vec<usize> = (0..m).collect();
            order.sort_by(|&a, &b| {
                pvals[a]
                    .partial_cmp(&pvals[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let mut adj_ranked = vec![0.0; m];
            for i in (0..m).rev() {
                let rank = i + 1;
                adj_ranked[i] = pvals[order[i]] * m as f64 / rank as f64;
                if i < m - 1 {
                    adj_ranked[i] = adj_ranked[i].min(adj_ranked[i + 1]);
                }
            }
            let mut out = vec![0.0; m];
            for (i, &idx) in order.iter().enumerate() {
                out[idx] = adj_ranked[i].min(1.0);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonferroni_multiplies_and_caps() {
        let adj = p_adjust(&[0.01, 0.04, 0.5], PAdjustMethod::Bonferroni);
        assert!((adj[0] - 0.03).abs() < 1e-12);
        assert!((adj[1] - 0.12).abs() < 1e-12);
        assert_eq!(adj[2], 1.0);
    }

    #[test]
    fn holm_is_monotone_and_never_exceeds_bonferroni() {
        let pvals = [0.01, 0.02, 0.03, 0.2];
        let holm = p_adjust(&pvals, PAdjustMethod::Holm);
        let bonf = p_adjust(&pvals, PAdjustMethod::Bonferroni);
        for (h, b) in holm.iter().zip(bonf.iter()) {
            assert!(h <= b);
        }
        // Holm on the smallest p equals Bonferroni.
        assert!((holm[0] - 0.04).abs() < 1e-12);
    }

    #[test]
    fn fdr_bh_matches_hand_computation() {
        // Classic example: sorted p = [0.01, 0.02, 0.03, 0.04]
        let adj = p_adjust(&[0.04, 0.01, 0.03, 0.02], PAdjustMethod::FdrBh);
        // adjusted(sorted) = [0.04, 0.04, 0.04, 0.04]
        for a in adj {
            assert!((a - 0.04).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(p_adjust(&[], PAdjustMethod::FdrBh).is_empty());
    }

    #[test]
    fn single_p_is_unchanged() {
        for method in [
            PAdjustMethod::Bonferroni,
            PAdjustMethod::Holm,
            PAdjustMethod::FdrBh,
        ] {
            let adj = p_adjust(&[0.02], method);
            assert!((adj[0] - 0.02).abs() < 1e-12);
        }
    }
}
