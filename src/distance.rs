use ndarray::{Array2, ArrayView1, ArrayView2};

/// Cosine distance between two descriptor vectors: one minus the normalized
/// dot product, so identical directions give 0 and opposite directions 2.
///
/// A pair where either vector has zero norm has no defined angle; it is
/// assigned the maximal finite distance 1 so that one degenerate channel
/// cannot poison a candidate's score with NaN.
pub fn cosine_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    let denom = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if denom == 0.0 {
        return 1.0;
    }
    1.0 - a.dot(&b) / denom
}

/// Cosine distance for each positionally paired row of `a` and `b`.
///
/// Rows are paired by index: row `i` of `a` against row `i` of `b`.
pub fn paired_cosine_distances(a: ArrayView2<f32>, b: ArrayView2<f32>) -> Vec<f32> {
    debug_assert_eq!(a.dim(), b.dim());
    a.rows()
        .into_iter()
        .zip(b.rows())
        .map(|(ra, rb)| cosine_distance(ra, rb))
        .collect()
}

/// The full cosine-distance matrix between two descriptor sets.
///
/// Output shape is `[a.nrows(), b.nrows()]`: entry `(i, j)` is the distance
/// between row `i` of `a` and row `j` of `b`.
pub fn cosine_distance_matrix(a: ArrayView2<f32>, b: ArrayView2<f32>) -> Array2<f32> {
    Array2::from_shape_fn((a.nrows(), b.nrows()), |(i, j)| {
        cosine_distance(a.row(i), b.row(j))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v: Array1<f32> = array![0.3, -1.2, 4.0, 0.5];
        assert_relative_eq!(cosine_distance(v.view(), v.view()), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn opposite_vectors_have_distance_two() {
        let v: Array1<f32> = array![1.0, 2.0, -3.0];
        let w = -&v;
        assert_relative_eq!(cosine_distance(v.view(), w.view()), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn distance_is_symmetric() {
        let a: Array1<f32> = array![0.1, 0.9, -0.4];
        let b: Array1<f32> = array![2.0, -0.3, 0.7];
        assert_relative_eq!(
            cosine_distance(a.view(), b.view()),
            cosine_distance(b.view(), a.view()),
            epsilon = 1e-6
        );
    }

    #[test]
    fn zero_norm_pair_is_maximally_distant() {
        let a: Array1<f32> = array![0.0, 0.0];
        let b: Array1<f32> = array![1.0, 0.0];
        assert_relative_eq!(cosine_distance(a.view(), b.view()), 1.0);
    }

    #[test]
    fn paired_distances_follow_row_order() {
        let a = array![[1.0f32, 0.0], [0.0, 1.0]];
        let b = array![[-1.0f32, 0.0], [0.0, 1.0]];
        let d = paired_cosine_distances(a.view(), b.view());
        assert_relative_eq!(d[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(d[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn matrix_pairs_every_row() {
        let a = array![[1.0f32, 0.0], [0.0, 1.0]];
        let b = array![[1.0f32, 0.0], [-1.0, 0.0], [0.0, 1.0]];
        let m = cosine_distance_matrix(a.view(), b.view());
        assert_eq!(m.dim(), (2, 3));
        assert_relative_eq!(m[[0, 0]], 0.0, epsilon = 1e-6);
        assert_relative_eq!(m[[0, 1]], 2.0, epsilon = 1e-6);
        assert_relative_eq!(m[[1, 2]], 0.0, epsilon = 1e-6);
    }
}
