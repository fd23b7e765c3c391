//! Structural clustering of candidate rows (the third detection phase).

use std::collections::HashSet;

use bulletin_config::CompiledPatterns;

use super::features::RowFeatures;

/// Weighted structural similarity between two candidate rows, in `[0, 1]`.
///
/// Weights: 0.30 tag, 0.20 parent tag, 0.30 class-set Jaccard, 0.20
/// sibling-count closeness (zero once the counts differ by ten or more).
pub fn similarity(a: &RowFeatures<'_>, b: &RowFeatures<'_>) -> f64 {
    let mut score = 0.0;

    if a.tag == b.tag {
        score += 0.3;
    }
    if a.parent_tag == b.parent_tag {
        score += 0.2;
    }

    let classes_a: HashSet<&str> = a.classes.iter().map(String::as_str).collect();
    let classes_b: HashSet<&str> = b.classes.iter().map(String::as_str).collect();
    if !classes_a.is_empty() || !classes_b.is_empty() {
        let intersection = classes_a.intersection(&classes_b).count();
        let union = classes_a.union(&classes_b).count();
        if union > 0 {
            score += 0.3 * intersection as f64 / union as f64;
        }
    }

    let sibling_diff = a.sibling_count.abs_diff(b.sibling_count) as f64;
    score += 0.2 * (1.0 - sibling_diff / 10.0).max(0.0);

    score
}

/// Cluster rows at the given similarity threshold and return the cluster
/// representatives, largest cluster first.
///
/// A row joins the first cluster whose representative it resembles; the
/// representative is always the member with the most same-tag siblings,
/// since that member sits in the densest part of the board.
pub fn cluster_representatives<'f, 'a>(
    rows: &'f [RowFeatures<'a>],
    threshold: f64,
) -> Vec<&'f RowFeatures<'a>> {
    struct Cluster {
        representative: usize,
        size: usize,
    }

    let mut clusters: Vec<Cluster> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match clusters
            .iter_mut()
            .find(|c| similarity(row, &rows[c.representative]) >= threshold)
        {
            Some(cluster) => {
                cluster.size += 1;
                if row.sibling_count > rows[cluster.representative].sibling_count {
                    cluster.representative = index;
                }
            }
            None => clusters.push(Cluster {
                representative: index,
                size: 1,
            }),
        }
    }

    clusters.sort_by(|a, b| b.size.cmp(&a.size));
    clusters
        .into_iter()
        .map(|c| &rows[c.representative])
        .collect()
}

/// Score a representative row as a notice-row candidate.
///
/// Rewards dense sibling groups (capped at twenty), an anchor, a row-sized
/// amount of text, and notice keywords in the text.
pub fn score_row(row: &RowFeatures<'_>, patterns: &CompiledPatterns) -> f64 {
    let mut score = 0.4 * (row.sibling_count as f64 / 20.0).min(1.0);

    if row.has_link {
        score += 0.3;
    }

    if (20..=200).contains(&row.text_length) {
        score += 0.2;
    } else if row.text_length > 200 {
        score += 0.1;
    }

    if patterns.contains_keyword(&row.text) {
        score += 0.1;
    }

    score
}
