use std::collections::HashSet;

use crate::entities::recommendation::AlumniEmbedding;

/// Cosine similarity of two vectors. Mismatched lengths or zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Linear scan over stored embeddings, most similar first.
pub fn rank_by_similarity(
    query: &[f32],
    embeddings: &[AlumniEmbedding],
    exclude: &HashSet<i64>,
    limit: usize,
) -> Vec<(i64, f64)> {
    let mut ranked: Vec<(i64, f64)> = embeddings
        .iter()
        .filter(|e| !exclude.contains(&e.csv_row_id))
        .map(|e| (e.csv_row_id, cosine_similarity(query, &e.embedding)))
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);
    ranked
}
