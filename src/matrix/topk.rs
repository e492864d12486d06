use crate::api::models::Hero;
use crate::matrix::builder::{HeroId, Matrix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_K: usize = 50;
pub const MAX_K: usize = 100;

/// One ranked partner/opponent entry; score is the cell score rounded
/// to the nearest integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopKEntry {
    pub id: HeroId,
    pub score: i64,
}

/// hero -> descending `{id, score}` list, at most K entries each.
pub type TopKMatrix = BTreeMap<HeroId, Vec<TopKEntry>>;

/// Requested K bounded to the supported range.
pub fn clamp_k(k: usize) -> usize {
    k.clamp(1, MAX_K)
}

/// Reduce a full matrix to per-hero top-K lists. Sorted by score
/// descending, ties broken by ascending id so runs are reproducible.
/// Every roster hero gets a list, possibly empty.
pub fn build_topk(heroes: &[Hero], matrix: &Matrix, k: usize) -> TopKMatrix {
    let k = clamp_k(k);
    let mut out = TopKMatrix::new();
    for hero in heroes {
        let mut entries: Vec<TopKEntry> = matrix
            .get(&hero.id)
            .map(|row| {
                row.iter()
                    .map(|(&id, cell)| TopKEntry {
                        id,
                        score: cell.score.round() as i64,
                    })
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        entries.truncate(k);
        out.insert(hero.id, entries);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::builder::MatrixCell;

    fn hero(id: HeroId) -> Hero {
        Hero {
            id,
            name: format!("Hero {}", id),
            roles: vec![],
            icon: String::new(),
        }
    }

    fn cell(score: f64) -> MatrixCell {
        MatrixCell { games: 10, wr: 0.5, lift: 0.0, score }
    }

    #[test]
    fn k_is_clamped_to_supported_range() {
        assert_eq!(clamp_k(200), 100);
        assert_eq!(clamp_k(0), 1);
        assert_eq!(clamp_k(50), 50);
    }

    #[test]
    fn entries_sorted_descending_with_id_tiebreak() {
        let mut row = BTreeMap::new();
        row.insert(9, cell(12.4)); // rounds to 12
        row.insert(3, cell(11.6)); // rounds to 12
        row.insert(5, cell(20.0));
        row.insert(7, cell(-4.2));
        let matrix: Matrix = [(1, row)].into_iter().collect();

        let topk = build_topk(&[hero(1)], &matrix, 10);
        let list = &topk[&1];
        assert_eq!(
            list.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![5, 3, 9, 7]
        );
        for pair in list.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn lists_truncate_to_k() {
        let row: BTreeMap<_, _> = (1..=8).map(|id| (id, cell(id as f64))).collect();
        let matrix: Matrix = [(1, row)].into_iter().collect();
        let topk = build_topk(&[hero(1)], &matrix, 3);
        assert_eq!(topk[&1].len(), 3);
        assert_eq!(topk[&1][0], TopKEntry { id: 8, score: 8 });
    }

    #[test]
    fn rounded_scores_match_matrix_cells() {
        let mut row = BTreeMap::new();
        row.insert(2, cell(17.51));
        let matrix: Matrix = [(1, row)].into_iter().collect();
        let topk = build_topk(&[hero(1)], &matrix, 50);
        assert_eq!(topk[&1][0].score, matrix[&1][&2].score.round() as i64);
    }

    #[test]
    fn roster_hero_missing_from_matrix_gets_empty_list() {
        let matrix = Matrix::new();
        let topk = build_topk(&[hero(1), hero(2)], &matrix, 50);
        assert_eq!(topk.len(), 2);
        assert!(topk[&1].is_empty());
    }
}
