//! Array position lookups.

use ndarray::Array2;
use num_traits::Float;

/// Position of the element closest to `value`.
///
/// Closeness is the relative difference `|a / value - 1|`, so the search is
/// scale-free. For `value == 0` only an exact zero matches. Ties go to the
/// first occurrence.
pub fn first_index<T: Float>(values: &[T], value: T) -> Option<usize> {
    if value.is_zero() {
        return values.iter().position(|v| v.is_zero());
    }

    let mut best: Option<(usize, T)> = None;
    for (i, &a) in values.iter().enumerate() {
        let ratio = (a / value - T::one()).abs();
        if ratio.is_nan() {
            continue;
        }
        match best {
            Some((_, r)) if r <= ratio => {}
            _ => best = Some((i, ratio)),
        }
    }
    best.map(|(i, _)| i)
}

/// Positions of every element of `values` that appears in `select`.
pub fn index_1d<T: PartialEq>(values: &[T], select: &[T]) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| select.contains(*v))
        .map(|(i, _)| i)
        .collect()
}

/// Row and column indices of every element of `array` that appears in
/// `select`, in row-major order.
pub fn index_2d<T: PartialEq>(array: &Array2<T>, select: &[T]) -> (Vec<usize>, Vec<usize>) {
    array
        .indexed_iter()
        .filter(|(_, v)| select.contains(*v))
        .map(|(idx, _)| idx)
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_first_index_nearest() {
        let values = [100.0, 200.0, 300.0, 400.0];
        assert_eq!(first_index(&values, 290.0), Some(2));
        assert_eq!(first_index(&values, 1000.0), Some(3));
        assert_eq!(first_index(&values, -5.0), Some(0));
    }

    #[test]
    fn test_first_index_ties_take_first() {
        let values = [1.0, 3.0, 3.0];
        assert_eq!(first_index(&values, 3.0), Some(1));
    }

    #[test]
    fn test_first_index_zero() {
        assert_eq!(first_index(&[1.0, 0.0, 0.0], 0.0), Some(1));
        assert_eq!(first_index(&[1.0, 2.0], 0.0), None);
        assert_eq!(first_index::<f64>(&[], 1.0), None);
    }

    #[test]
    fn test_first_index_f32() {
        let values: [f32; 3] = [0.5, 1.5, 2.5];
        assert_eq!(first_index(&values, 1.4), Some(1));
    }

    #[test]
    fn test_index_1d() {
        let a = [1, 2, 3, 4, 5, 6, 6, 6, 6, 7, 7, 8, 9, 9];
        assert_eq!(index_1d(&a, &[6, 7, 9]), vec![5, 6, 7, 8, 9, 10, 12, 13]);
        assert!(index_1d(&a, &[42]).is_empty());
    }

    #[test]
    fn test_index_2d() {
        let a = array![[1, 6, 3], [7, 5, 6]];
        let (rows, cols) = index_2d(&a, &[6, 7]);
        assert_eq!(rows, vec![0, 1, 1]);
        assert_eq!(cols, vec![1, 0, 2]);
    }
}
