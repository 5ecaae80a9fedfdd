use std::cmp::Ordering;

use serde::Serialize;

use crate::error::Error;

/// Allows comparing and sorting f32 even if `NaN` is involved.
///
/// Pretend that f32 has a total ordering.
///
/// `NaN` is treated as the lowest possible value, similar to what [`f32::max`] does.
///
/// If this is used for sorting this will lead to an ascending order, like
/// for example:
///
/// ```ignore
/// [NaN, -inf, -1.0, 0.0, 1.0, inf]
/// ```
pub(crate) fn nan_safe_f32_cmp(a: &f32, b: &f32) -> Ordering {
    a.partial_cmp(b).unwrap_or_else(|| {
        // if `partial_cmp` returns None we have at least one NaN,
        // so we give it the lowest value
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, _) => Ordering::Less,
            (_, true) => Ordering::Greater,
            _ => unreachable!("partial_cmp returned None but both numbers are not NaN"),
        }
    })
}

/// `nan_safe_f32_cmp_desc(a,b)` is clearer than `nan_safe_f32_cmp(b,a)`
pub(crate) fn nan_safe_f32_cmp_desc(a: &f32, b: &f32) -> Ordering {
    nan_safe_f32_cmp(b, a)
}

/// The logistic function.
pub(crate) fn sigmoid(x: f32) -> f32 {
    1. / (1. + (-x).exp())
}

/// Serializes the data prefixed by the schema version in the first byte.
pub(crate) fn serialize_with_version(data: &impl Serialize, version: u8) -> Result<Vec<u8>, Error> {
    let size = bincode::serialized_size(data)? + 1;
    let mut serialized = Vec::with_capacity(size as usize);
    // version is encoded in the first byte
    serialized.push(version);
    bincode::serialize_into(&mut serialized, data)?;

    Ok(serialized)
}

#[cfg(test)]
mod tests {
    use test_utils::assert_approx_eq;

    use super::*;

    #[test]
    fn test_nan_safe_f32_cmp_sorts_nan_first() {
        let mut values = vec![1., f32::NAN, -1., f32::INFINITY, 0.];
        values.sort_by(nan_safe_f32_cmp);

        assert!(values[0].is_nan());
        assert_eq!(&values[1..], &[-1., 0., 1., f32::INFINITY]);
    }

    #[test]
    fn test_nan_safe_f32_cmp_desc() {
        let mut values = vec![0.5, 2., f32::NAN, 1.];
        values.sort_by(nan_safe_f32_cmp_desc);

        assert_approx_eq!(f32, &values[..3], [2., 1., 0.5]);
        assert!(values[3].is_nan());
    }

    #[test]
    fn test_sigmoid() {
        assert_approx_eq!(f32, sigmoid(0.), 0.5);
        assert_approx_eq!(f32, sigmoid(2.), 0.880_797_1);
        assert_approx_eq!(f32, sigmoid(-2.), 0.119_202_92);
    }

    #[test]
    fn test_serialize_with_version_prefixes_version() {
        let serialized = serialize_with_version(&7_u32, 3).unwrap();

        assert_eq!(serialized[0], 3);
        assert_eq!(bincode::deserialize::<u32>(&serialized[1..]).unwrap(), 7);
    }
}
