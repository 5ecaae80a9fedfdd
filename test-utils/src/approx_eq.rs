use ndarray::{ArrayBase, Data, Dimension, IntoDimension};

/// Asserts that two collections of `f32` are approximately equal, element by element.
///
/// Both sides are flattened into their leaves together with the logical index of every leaf,
/// so a scalar can be compared with a scalar and an array, a slice, a vector or an ndarray
/// array with any other of those of the same shape.
///
/// ```
/// use ndarray::arr1;
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(f32, 0.1 + 0.2, 0.3);
/// assert_approx_eq!(f32, arr1(&[0.5, 1.5]), vec![0.5, 1.5]);
/// assert_approx_eq!(f32, [1., 2.], [1.01, 2.], epsilon = 0.1);
/// ```
///
/// The tolerance defaults to `2` ulps and no epsilon. Two NaN leaves at the same index count
/// as equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($t:ty, $left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, ulps = $ulps:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = $ulps)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = $epsilon, ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr, ulps = $ulps:expr $(,)?) => {{
        let (epsilon, ulps) = ($epsilon, $ulps);
        match ($left, $right) { (left, right) => {
        let left = $crate::Leaves::leaves(&left, ::std::vec::Vec::new());
        let right = $crate::Leaves::leaves(&right, ::std::vec::Vec::new());

        ::std::assert_eq!(
            left.len(),
            right.len(),
            "number of values differs: {:?} != {:?}",
            left,
            right,
        );
        for ((left_index, left_value), (right_index, right_value)) in left.iter().zip(&right) {
            ::std::assert_eq!(left_index, right_index, "shapes differ");
            let both_nan = left_value.is_nan() && right_value.is_nan();
            ::std::assert!(
                both_nan
                    || $crate::approx_eq!(
                        $t,
                        *left_value,
                        *right_value,
                        epsilon = epsilon,
                        ulps = ulps
                    ),
                "{:?} != {:?} at index {:?} (epsilon = {:?}, ulps = {:?})",
                left_value,
                right_value,
                left_index,
                epsilon,
                ulps,
            );
        }
        }}
    }};
}

/// Flattens a value into its `f32` leaves for [`assert_approx_eq!`].
///
/// Implemented on references, nested containers prepend their own index to the indices of
/// their elements.
pub trait Leaves {
    fn leaves(self, prefix: Vec<usize>) -> Vec<(Vec<usize>, f32)>;
}

impl Leaves for &f32 {
    fn leaves(self, prefix: Vec<usize>) -> Vec<(Vec<usize>, f32)> {
        vec![(prefix, *self)]
    }
}

impl<'a, T: ?Sized> Leaves for &&'a T
where
    &'a T: Leaves,
{
    fn leaves(self, prefix: Vec<usize>) -> Vec<(Vec<usize>, f32)> {
        (*self).leaves(prefix)
    }
}

impl<'a, T> Leaves for &'a [T]
where
    &'a T: Leaves,
{
    fn leaves(self, prefix: Vec<usize>) -> Vec<(Vec<usize>, f32)> {
        self.iter()
            .enumerate()
            .flat_map(|(index, element)| {
                let mut prefix = prefix.clone();
                prefix.push(index);
                element.leaves(prefix)
            })
            .collect()
    }
}

impl<'a, T, const N: usize> Leaves for &'a [T; N]
where
    &'a T: Leaves,
{
    fn leaves(self, prefix: Vec<usize>) -> Vec<(Vec<usize>, f32)> {
        self[..].leaves(prefix)
    }
}

impl<'a, T> Leaves for &'a Vec<T>
where
    &'a T: Leaves,
{
    fn leaves(self, prefix: Vec<usize>) -> Vec<(Vec<usize>, f32)> {
        self.as_slice().leaves(prefix)
    }
}

impl<'a, T> Leaves for &'a Option<T>
where
    &'a T: Leaves,
{
    fn leaves(self, prefix: Vec<usize>) -> Vec<(Vec<usize>, f32)> {
        self.as_ref()
            .map(|value| {
                let mut prefix = prefix.clone();
                prefix.push(0);
                value.leaves(prefix)
            })
            .unwrap_or_default()
    }
}

impl<S, D> Leaves for &ArrayBase<S, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    fn leaves(self, prefix: Vec<usize>) -> Vec<(Vec<usize>, f32)> {
        self.indexed_iter()
            .map(|(index, value)| {
                let mut prefix = prefix.clone();
                prefix.extend(index.into_dimension().as_array_view().iter());
                (prefix, *value)
            })
            .collect()
    }
}
