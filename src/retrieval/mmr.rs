// file: src/retrieval/mmr.rs
// description: cosine similarity and maximal marginal relevance selection
// reference: https://www.cs.cmu.edu/~jgc/publication/The_Use_MMR_Diversity_Based_LTMIR_1998.pdf

/// Cosine similarity of two vectors; 0.0 when either is zero or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Greedy MMR: each pick maximizes
/// `lambda * relevance - (1 - lambda) * max_similarity_to_picked`.
/// Returns candidate indices in pick order; ties go to the earlier candidate.
pub fn select(relevance: &[f32], embeddings: &[&[f32]], k: usize, lambda: f32) -> Vec<usize> {
    let n = relevance.len().min(embeddings.len());
    let mut picked: Vec<usize> = Vec::with_capacity(k.min(n));
    let mut remaining: Vec<usize> = (0..n).collect();

    while picked.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (pos, &candidate) in remaining.iter().enumerate() {
            let redundancy = picked
                .iter()
                .map(|&chosen| cosine_similarity(embeddings[candidate], embeddings[chosen]))
                .fold(0.0f32, f32::max);

            let score = lambda * relevance[candidate] - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        picked.push(remaining.remove(best_pos));
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_pure_relevance_keeps_score_order() {
        let embeddings: Vec<&[f32]> = vec![&[1.0, 0.0], &[0.9, 0.1], &[0.0, 1.0]];
        let picked = select(&[0.5, 0.9, 0.7], &embeddings, 3, 1.0);
        assert_eq!(picked, vec![1, 2, 0]);
    }

    #[test]
    fn test_diversity_skips_near_duplicates() {
        let a: &[f32] = &[1.0, 0.0];
        let a_dup: &[f32] = &[0.999, 0.01];
        let b: &[f32] = &[0.0, 1.0];
        let picked = select(&[0.95, 0.94, 0.6], &[a, a_dup, b], 2, 0.5);
        assert_eq!(picked, vec![0, 2]);
    }

    #[test]
    fn test_k_larger_than_candidates() {
        let embeddings: Vec<&[f32]> = vec![&[1.0]];
        assert_eq!(select(&[0.3], &embeddings, 5, 0.5), vec![0]);
        assert!(select(&[], &[], 5, 0.5).is_empty());
    }
}
