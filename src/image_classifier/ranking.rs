/// Probability distribution over `logits`.
///
/// The largest logit is subtracted before exponentiating so large scores
/// cannot overflow.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&logit| (logit - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// The `k` highest scores as `(index, score)`, highest first. Equal scores
/// keep the lower index first.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probabilities = softmax(&[1.0, 2.0, 3.0, -4.0]);
        let sum: f32 = probabilities.iter().sum();

        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probabilities[2] > probabilities[1]);
        assert!(probabilities[1] > probabilities[0]);
    }

    #[test]
    fn test_softmax_large_logits_do_not_overflow() {
        let probabilities = softmax(&[1000.0, 1000.0, 999.0]);

        assert!(probabilities.iter().all(|p| p.is_finite()));
        assert!((probabilities[0] - probabilities[1]).abs() < 1e-7);
        let sum: f32 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = softmax(&[0.5, -1.0, 2.0]);
        let b = softmax(&[100.5, 99.0, 102.0]);

        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_top_k_descending() {
        let ranked = top_k(&[0.1, 0.4, 0.2, 0.3], 3);

        assert_eq!(ranked, vec![(1, 0.4), (3, 0.3), (2, 0.2)]);
    }

    #[test]
    fn test_top_k_ties_prefer_lower_index() {
        let ranked = top_k(&[0.25, 0.1, 0.25, 0.25, 0.15], 4);

        let indices: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_top_k_larger_than_input() {
        let ranked = top_k(&[0.5, 0.5], 10);

        assert_eq!(ranked.len(), 2);
    }
}
