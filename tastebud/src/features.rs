use derive_more::{Deref, From};
use ndarray::{s, Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Guards the cosine similarity against zero norms.
pub(crate) const COSINE_EPSILON: f32 = 1e-9;

/// The fixed-length numeric embedding of an item.
///
/// Vectors of different lengths are compared as if the shorter one was right-padded with zeros.
/// Non-finite values are replaced by zero on construction.
#[derive(Clone, Debug, Default, Deref, From, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f32>", into = "Vec<f32>")]
pub struct FeatureVector(Array1<f32>);

impl FeatureVector {
    /// Creates a feature vector from the given values.
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        values
            .into_iter()
            .map(|value| if value.is_finite() { value } else { 0. })
            .collect::<Array1<_>>()
            .into()
    }

    /// Creates an all-zero feature vector.
    pub fn zeros(len: usize) -> Self {
        Self(Array1::zeros(len))
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl From<FeatureVector> for Vec<f32> {
    fn from(features: FeatureVector) -> Self {
        features.0.to_vec()
    }
}

/// Views the features, a missing vector is viewed as the empty (ie. all-zero) vector.
pub(crate) fn view_or_empty(features: Option<&FeatureVector>) -> ArrayView1<'_, f32> {
    features.map_or_else(|| ArrayView1::from(&[] as &[f32]), |features| features.view())
}

/// Right-pads the vector with zeros up to `len`, longer vectors are kept as is.
pub(crate) fn zero_padded(a: ArrayView1<'_, f32>, len: usize) -> Array1<f32> {
    if a.len() >= len {
        return a.to_owned();
    }

    let mut padded = Array1::zeros(len);
    padded.slice_mut(s![..a.len()]).assign(&a);
    padded
}

/// Computes the dot product, missing elements of the shorter vector count as zero.
pub(crate) fn dot(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    let len = a.len().min(b.len());
    a.slice(s![..len]).dot(&b.slice(s![..len]))
}

/// Computes the element-wise difference `a - b` of length `max(|a|, |b|)`.
pub(crate) fn difference(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> Array1<f32> {
    let len = a.len().max(b.len());
    zero_padded(a, len) - zero_padded(b, len)
}

/// Computes the cosine similarity of two vectors.
///
/// The similarity involving a zero vector is zero.
pub(crate) fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    dot(a, b) / (norm_a * norm_b + COSINE_EPSILON)
}
