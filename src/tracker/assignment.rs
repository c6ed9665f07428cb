//! Minimum-cost bipartite assignment between cost-matrix rows and columns.

use log::warn;
use ndarray::Array2;

/// Upper bound on the total tie-break bias of any assignment. Far below the
/// resolution of `f32` IoU costs, so it only decides between equal costs.
const TIE_BREAK_BUDGET: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(row, column)` pairs, ascending by row
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Solve the assignment for `cost_matrix` and keep only pairs cheaper than
/// `max_cost`.
///
/// The rectangular `n x m` matrix is extended to `(n + m) x (n + m)` with
/// dummy rows and columns. Leaving a row or a column unassigned costs
/// `max_cost / 2`, so the solver pairs a track with a detection only when that
/// pair is cheaper than leaving both unmatched.
///
/// Equal-cost alternatives resolve toward lower rows, then lower columns:
/// rows are given in ascending track id and columns in detection order, so
/// ties go to the older track and the earlier detection. The solver sees each
/// real cost plus a tiny bias from [`tie_break_bias`]; acceptance against
/// `max_cost` uses the unbiased cost.
pub fn linear_assignment(cost_matrix: &Array2<f32>, max_cost: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    let size = num_rows + num_cols;
    let half_limit = max_cost as f64 / 2.0;
    let bias = tie_break_bias(num_rows, num_cols);
    let extended = Array2::<f64>::from_shape_fn((size, size), |(i, j)| {
        match (i < num_rows, j < num_cols) {
            (true, true) => cost_matrix[[i, j]] as f64 + bias(i, j),
            (false, false) => 0.0,
            _ => half_limit,
        }
    });

    let mut matches = vec![];
    let mut row_matched = vec![false; num_rows];
    let mut col_matched = vec![false; num_cols];

    match lapjv::lapjv(&extended) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().take(num_rows).enumerate() {
                if col_idx < num_cols && cost_matrix[[row_idx, col_idx]] < max_cost {
                    matches.push((row_idx, col_idx));
                    row_matched[row_idx] = true;
                    col_matched[col_idx] = true;
                }
            }
        }
        Err(e) => {
            warn!(
                "assignment solver failed on {}x{} matrix, leaving everything unmatched: {:?}",
                num_rows, num_cols, e
            );
        }
    }

    AssignmentResult {
        matches,
        unmatched_tracks: unmatched(&row_matched),
        unmatched_detections: unmatched(&col_matched),
    }
}

/// Bias `unit * (a * (i + j) - i * j)` with `a = rows + cols`.
///
/// The `a * (i + j)` part makes pairs on lower indices cheaper, so they are
/// matched first. The `-i * j` part is strictly Monge: for `i < i'` and
/// `j < j'`, pairing `(i, j), (i', j')` is cheaper than `(i, j'), (i', j)`, so
/// among equal costs the pairs never cross. The bias is non-negative since
/// `a >= i`, and `unit` keeps the sum over all pairs within
/// [`TIE_BREAK_BUDGET`].
fn tie_break_bias(num_rows: usize, num_cols: usize) -> impl Fn(usize, usize) -> f64 {
    let a = (num_rows + num_cols) as f64;
    let max_pairs = num_rows.min(num_cols) as f64;
    let unit = TIE_BREAK_BUDGET / (max_pairs * 2.0 * a * a);
    move |i, j| {
        let (i, j) = (i as f64, j as f64);
        unit * (a * (i + j) - i * j)
    }
}

fn unmatched(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &matched)| (!matched).then_some(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::matching::FORBIDDEN_COST;
    use ndarray::array;

    #[test]
    fn test_empty_matrix() {
        let res = linear_assignment(&Array2::zeros((0, 3)), 1.0);
        assert!(res.matches.is_empty());
        assert_eq!(res.unmatched_detections, vec![0, 1, 2]);

        let res = linear_assignment(&Array2::zeros((2, 0)), 1.0);
        assert_eq!(res.unmatched_tracks, vec![0, 1]);
    }

    #[test]
    fn test_optimal_square_assignment() {
        let costs = array![[0.9, 0.1], [0.2, 0.8]];
        let res = linear_assignment(&costs, 1.0);
        assert_eq!(res.matches, vec![(0, 1), (1, 0)]);
        assert!(res.unmatched_tracks.is_empty());
        assert!(res.unmatched_detections.is_empty());
    }

    #[test]
    fn test_rectangular_assignment() {
        let costs = array![[0.3, 0.05, 0.7]];
        let res = linear_assignment(&costs, 1.0);
        assert_eq!(res.matches, vec![(0, 1)]);
        assert_eq!(res.unmatched_detections, vec![0, 2]);

        let costs = array![[0.6], [0.2], [0.9]];
        let res = linear_assignment(&costs, 1.0);
        assert_eq!(res.matches, vec![(1, 0)]);
        assert_eq!(res.unmatched_tracks, vec![0, 2]);
    }

    #[test]
    fn test_forbidden_pairs_never_match() {
        let costs = array![[FORBIDDEN_COST, FORBIDDEN_COST], [FORBIDDEN_COST, 0.4]];
        let res = linear_assignment(&costs, 1.0);
        assert_eq!(res.matches, vec![(1, 1)]);
        assert_eq!(res.unmatched_tracks, vec![0]);
        assert_eq!(res.unmatched_detections, vec![0]);
    }

    #[test]
    fn test_threshold_rejects_expensive_pairs() {
        let costs = array![[0.75, FORBIDDEN_COST], [FORBIDDEN_COST, 0.2]];
        let res = linear_assignment(&costs, 0.5);
        assert_eq!(res.matches, vec![(1, 1)]);
        assert_eq!(res.unmatched_tracks, vec![0]);
        assert_eq!(res.unmatched_detections, vec![0]);
    }

    #[test]
    fn test_strong_match_beats_two_weak_ones() {
        // Two 0.9 pairs save 0.2 over leaving everything unmatched, the single
        // 0.1 pair saves 0.9.
        let costs = array![[0.1, 0.9], [0.9, FORBIDDEN_COST]];
        let res = linear_assignment(&costs, 1.0);
        assert_eq!(res.matches, vec![(0, 0)]);
        assert_eq!(res.unmatched_tracks, vec![1]);
        assert_eq!(res.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_repeatable() {
        let costs = array![[0.5, 0.5, 0.5], [0.5, 0.5, 0.5]];
        let first = linear_assignment(&costs, 1.0);
        for _ in 0..5 {
            assert_eq!(linear_assignment(&costs, 1.0), first);
        }
        assert_eq!(first.matches, vec![(0, 0), (1, 1)]);
        assert_eq!(first.unmatched_detections, vec![2]);
    }

    #[test]
    fn test_ties_prefer_lower_rows_then_lower_columns() {
        let res = linear_assignment(&Array2::from_elem((2, 2), 0.5), 1.0);
        assert_eq!(res.matches, vec![(0, 0), (1, 1)]);

        let res = linear_assignment(&Array2::from_elem((1, 2), 0.5), 1.0);
        assert_eq!(res.matches, vec![(0, 0)]);
        assert_eq!(res.unmatched_detections, vec![1]);

        let res = linear_assignment(&Array2::from_elem((3, 2), 0.5), 1.0);
        assert_eq!(res.matches, vec![(0, 0), (1, 1)]);
        assert_eq!(res.unmatched_tracks, vec![2]);

        let res = linear_assignment(&Array2::from_elem((4, 4), 0.25), 1.0);
        assert_eq!(res.matches, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_tie_break_never_overrides_real_costs() {
        // The diagonal is the tie-break favourite but costs more.
        let costs = array![[0.5, 0.5], [0.5, 0.9]];
        let res = linear_assignment(&costs, 1.0);
        assert_eq!(res.matches, vec![(0, 1), (1, 0)]);

        let costs = array![[0.3, 0.3 - 1e-6]];
        let res = linear_assignment(&costs, 1.0);
        assert_eq!(res.matches, vec![(0, 1)]);
    }

    #[test]
    fn test_bias_stays_within_budget() {
        for (n, m) in [(1, 1), (2, 3), (40, 25), (200, 200)] {
            let bias = tie_break_bias(n, m);
            let worst: f64 = (0..n.min(m)).map(|k| bias(n - 1 - k, m - 1 - k)).sum();
            assert!(worst <= TIE_BREAK_BUDGET, "{n}x{m}: {worst}");
            assert!(bias(0, 0) < bias(0, 1));
            assert!(bias(0, 0) + bias(1, 1) < bias(0, 1) + bias(1, 0));
        }
    }
}
