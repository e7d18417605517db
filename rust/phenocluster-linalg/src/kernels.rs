// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

use num_traits::Float;

/// Returns the minimal value (float) and the index (argmin) from an Iterator.
///
/// Ties go to the lowest index. `NaN` and `+inf` never win, so this returns
/// `None` if the iterator is empty or all values are `NaN/Inf`.
pub fn argmin_value_float<T: Float>(iter: impl Iterator<Item = T>) -> Option<(u32, T)> {
    let mut min_idx = None;
    let mut min_value = T::infinity();
    for (idx, value) in iter.enumerate() {
        if value < min_value {
            min_value = value;
            min_idx = Some(idx as u32);
        }
    }
    min_idx.map(|idx| (idx, min_value))
}

/// Argmin over a float iterator, see [`argmin_value_float`].
#[inline]
pub fn argmin_float<T: Float>(iter: impl Iterator<Item = T>) -> Option<u32> {
    argmin_value_float(iter).map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmin() {
        assert_eq!(argmin_float([3.0, 1.0, 2.0].into_iter()), Some(1));
        assert_eq!(
            argmin_value_float([3.0_f32, 1.0, 2.0].into_iter()),
            Some((1, 1.0))
        );
        assert_eq!(argmin_float(std::iter::empty::<f64>()), None);
    }

    #[test]
    fn test_argmin_ties_go_to_lowest_index() {
        assert_eq!(argmin_float([2.0, 1.0, 1.0, 1.0].into_iter()), Some(1));
    }

    #[test]
    fn test_argmin_nan_never_wins() {
        assert_eq!(argmin_float([f64::NAN, 5.0, f64::NAN].into_iter()), Some(1));
        assert_eq!(argmin_float([5.0, f64::NAN].into_iter()), Some(0));
        assert_eq!(argmin_float([f64::NAN, f64::NAN].into_iter()), None);
        assert_eq!(
            argmin_float([f64::INFINITY, f64::NAN, f64::INFINITY].into_iter()),
            None
        );
    }
}
