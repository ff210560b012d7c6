//! Preprocessing transforms — forward/inverse channel-wise normalization.
//!
//! Purpose
//! -------
//! Provide the interface through which the prediction stack applies the
//! preprocessing that was used when the model was identified (mean removal,
//! z-scoring) and maps predictions back into original units.
//!
//! Key behaviors
//! -------------
//! - [`SignalTransform`] exposes `apply` / `apply_inverse` on whole sequences
//!   and provided `apply_sample` / `apply_inverse_sample` helpers for a single
//!   time step.
//! - [`Preprocessor`] is the concrete set of variants (`Identity`,
//!   `MeanRemoval`, `ZScore`) selected when the model is built.
//! - [`apply_opt`] / [`apply_inverse_opt`] / [`apply_sample_opt`] treat an
//!   absent transform as the identity.
//!
//! Invariants & assumptions
//! ------------------------
//! - `apply_inverse(apply(x)) == x` up to floating-point rounding.
//! - Means are finite; scales are finite and non-zero (checked in the
//!   constructors).
//! - A transform with a fixed channel count rejects data of another width with
//!   `SSMError::DimensionMismatch`.
//!
//! Conventions
//! -----------
//! - `time_first = true` means axis 0 indexes time (the only layout used by
//!   the predictor); `false` means axis 1 indexes time.
//! - Transforms never mutate their input; they return freshly allocated
//!   arrays.
//!
//! Testing notes
//! -------------
//! - Unit tests cover round trips in both layouts, per-sample application,
//!   width checks, and constructor validation.
use crate::statespace::errors::{SSMError, SSMResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Forward/inverse channel-wise transform attached to one signal of a model.
pub trait SignalTransform {
    /// Number of channels the transform expects, or `None` for any width.
    fn n_channels(&self) -> Option<usize>;

    /// Forward transform (the preprocessing applied during identification).
    fn apply(&self, data: ArrayView2<f64>, time_first: bool) -> SSMResult<Array2<f64>>;

    /// Exact inverse of [`SignalTransform::apply`].
    fn apply_inverse(&self, data: ArrayView2<f64>, time_first: bool) -> SSMResult<Array2<f64>>;

    /// Forward transform of a single time step.
    fn apply_sample(&self, sample: ArrayView1<f64>) -> SSMResult<Array1<f64>> {
        let out = self.apply(sample.insert_axis(Axis(0)), true)?;
        Ok(out.index_axis_move(Axis(0), 0))
    }

    /// Inverse transform of a single time step.
    fn apply_inverse_sample(&self, sample: ArrayView1<f64>) -> SSMResult<Array1<f64>> {
        let out = self.apply_inverse(sample.insert_axis(Axis(0)), true)?;
        Ok(out.index_axis_move(Axis(0), 0))
    }
}

/// Preprocessor — concrete normalization variants.
///
/// Variants
/// --------
/// - `Identity`
///   No-op; accepts any channel count.
/// - `MeanRemoval { mean }`
///   `x ↦ x − mean` per channel.
/// - `ZScore { mean, std }`
///   `x ↦ (x − mean) / std` per channel.
///
/// Invariants
/// ----------
/// - `mean` entries are finite; `std` entries are finite and non-zero;
///   `mean.len() == std.len()`. Enforced by the constructors; building the
///   variants directly bypasses these checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Preprocessor {
    Identity,
    MeanRemoval { mean: Array1<f64> },
    ZScore { mean: Array1<f64>, std: Array1<f64> },
}

impl Preprocessor {
    pub fn identity() -> Self {
        Preprocessor::Identity
    }

    /// Build a z-score transform when a scale is given, else mean removal.
    ///
    /// Errors
    /// ------
    /// - Any error of [`Preprocessor::z_score`] or
    ///   [`Preprocessor::mean_removal`].
    pub fn from_moments(mean: Array1<f64>, std: Option<Array1<f64>>) -> SSMResult<Self> {
        match std {
            Some(std) => Preprocessor::z_score(mean, std),
            None => Preprocessor::mean_removal(mean),
        }
    }

    /// Build a validated mean-removal transform.
    ///
    /// Errors
    /// ------
    /// - `SSMError::InvalidTransform` if any mean entry is NaN or ±∞.
    pub fn mean_removal(mean: Array1<f64>) -> SSMResult<Self> {
        validate_mean(&mean)?;
        Ok(Preprocessor::MeanRemoval { mean })
    }

    /// Build a validated z-score transform.
    ///
    /// Errors
    /// ------
    /// - `SSMError::DimensionMismatch` if `mean` and `std` differ in length.
    /// - `SSMError::InvalidTransform` if a mean entry is non-finite, or a scale
    ///   entry is non-finite or zero.
    pub fn z_score(mean: Array1<f64>, std: Array1<f64>) -> SSMResult<Self> {
        if mean.len() != std.len() {
            return Err(SSMError::DimensionMismatch {
                what: "z-score scale",
                expected: (1, mean.len()),
                actual: (1, std.len()),
            });
        }
        validate_mean(&mean)?;
        for (index, &value) in std.iter().enumerate() {
            if !value.is_finite() {
                return Err(SSMError::InvalidTransform {
                    what: "z-score scale",
                    index,
                    value,
                    reason: "Scale must be finite.",
                });
            }
            if value == 0.0 {
                return Err(SSMError::InvalidTransform {
                    what: "z-score scale",
                    index,
                    value,
                    reason: "Scale must be non-zero.",
                });
            }
        }
        Ok(Preprocessor::ZScore { mean, std })
    }

    fn check_width(&self, data: &ArrayView2<f64>, time_first: bool) -> SSMResult<()> {
        let Some(n) = self.n_channels() else {
            return Ok(());
        };
        let (channels, expected) = if time_first {
            (data.ncols(), (data.nrows(), n))
        } else {
            (data.nrows(), (n, data.ncols()))
        };
        if channels != n {
            return Err(SSMError::DimensionMismatch {
                what: "transform input",
                expected,
                actual: data.dim(),
            });
        }
        Ok(())
    }
}

impl SignalTransform for Preprocessor {
    fn n_channels(&self) -> Option<usize> {
        match self {
            Preprocessor::Identity => None,
            Preprocessor::MeanRemoval { mean } => Some(mean.len()),
            Preprocessor::ZScore { mean, .. } => Some(mean.len()),
        }
    }

    fn apply(&self, data: ArrayView2<f64>, time_first: bool) -> SSMResult<Array2<f64>> {
        self.check_width(&data, time_first)?;
        let mut out = data.to_owned();
        match self {
            Preprocessor::Identity => {}
            Preprocessor::MeanRemoval { mean } => {
                out -= &channel_view(mean, time_first);
            }
            Preprocessor::ZScore { mean, std } => {
                out -= &channel_view(mean, time_first);
                out /= &channel_view(std, time_first);
            }
        }
        Ok(out)
    }

    fn apply_inverse(&self, data: ArrayView2<f64>, time_first: bool) -> SSMResult<Array2<f64>> {
        self.check_width(&data, time_first)?;
        let mut out = data.to_owned();
        match self {
            Preprocessor::Identity => {}
            Preprocessor::MeanRemoval { mean } => {
                out += &channel_view(mean, time_first);
            }
            Preprocessor::ZScore { mean, std } => {
                out *= &channel_view(std, time_first);
                out += &channel_view(mean, time_first);
            }
        }
        Ok(out)
    }
}

/// ModelTransforms — the transforms attached to a model, one per signal.
///
/// Fields
/// ------
/// - `y`: transform of the primary observation.
/// - `z`: transform of the behavior signal.
/// - `u`: transform of the exogenous input.
///
/// `None` is equivalent to the identity. Each transform is applied only to its
/// own signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTransforms<T = Preprocessor> {
    pub y: Option<T>,
    pub z: Option<T>,
    pub u: Option<T>,
}

impl<T> ModelTransforms<T> {
    pub fn new(y: Option<T>, z: Option<T>, u: Option<T>) -> Self {
        ModelTransforms { y, z, u }
    }
}

impl<T> Default for ModelTransforms<T> {
    fn default() -> Self {
        ModelTransforms { y: None, z: None, u: None }
    }
}

/// Forward transform, treating `None` as the identity.
pub fn apply_opt<T: SignalTransform>(
    transform: Option<&T>, data: ArrayView2<f64>, time_first: bool,
) -> SSMResult<Array2<f64>> {
    match transform {
        Some(t) => t.apply(data, time_first),
        None => Ok(data.to_owned()),
    }
}

/// Inverse transform, treating `None` as the identity.
pub fn apply_inverse_opt<T: SignalTransform>(
    transform: Option<&T>, data: ArrayView2<f64>, time_first: bool,
) -> SSMResult<Array2<f64>> {
    match transform {
        Some(t) => t.apply_inverse(data, time_first),
        None => Ok(data.to_owned()),
    }
}

/// Forward transform of one time step, treating `None` as the identity.
pub fn apply_sample_opt<T: SignalTransform>(
    transform: Option<&T>, sample: ArrayView1<f64>,
) -> SSMResult<Array1<f64>> {
    match transform {
        Some(t) => t.apply_sample(sample),
        None => Ok(sample.to_owned()),
    }
}

// ---- Helper Methods ----

/// View a per-channel vector so it broadcasts along the time axis.
fn channel_view(values: &Array1<f64>, time_first: bool) -> ArrayView2<'_, f64> {
    if time_first { values.view().insert_axis(Axis(0)) } else { values.view().insert_axis(Axis(1)) }
}

fn validate_mean(mean: &Array1<f64>) -> SSMResult<()> {
    match mean.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SSMError::InvalidTransform {
            what: "mean",
            index,
            value: mean[index],
            reason: "Mean must be finite.",
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward / inverse round trips for every variant, in both layouts.
    // - Agreement between per-sample and whole-sequence application.
    // - Width checks and constructor validation.
    //
    // They intentionally DO NOT cover:
    // - How means and scales are estimated; fitting is out of scope.
    // -------------------------------------------------------------------------

    fn assert_all_close(a: &Array2<f64>, b: &Array2<f64>) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that a z-score transform is inverted exactly (to rounding) when
    // time indexes the first axis.
    //
    // Given
    // -----
    // - `mean = [1.0, -2.0]`, `std = [0.5, 3.0]`, a 3×2 sequence.
    //
    // Expect
    // ------
    // - `apply` yields `(x − mean) / std` per channel.
    // - `apply_inverse(apply(x)) ≈ x`.
    fn zscore_round_trip_time_first() {
        let prep = Preprocessor::z_score(array![1.0, -2.0], array![0.5, 3.0]).unwrap();
        let x = array![[1.0, 1.0], [2.0, -2.0], [-0.3, 7.5]];

        let fwd = prep.apply(x.view(), true).unwrap();
        let back = prep.apply_inverse(fwd.view(), true).unwrap();

        assert_relative_eq!(fwd[[1, 0]], 2.0, epsilon = 1e-12);
        assert_relative_eq!(fwd[[0, 1]], 1.0, epsilon = 1e-12);
        assert_all_close(&back, &x);
    }

    #[test]
    // Purpose
    // -------
    // Verify the channels-first layout broadcasts the mean along axis 1.
    //
    // Given
    // -----
    // - Mean removal with `mean = [10.0, 20.0]` and a 2×3 channels-first array.
    //
    // Expect
    // ------
    // - Row 0 is shifted by 10, row 1 by 20; the inverse restores the input.
    fn mean_removal_channels_first_layout() {
        let prep = Preprocessor::mean_removal(array![10.0, 20.0]).unwrap();
        let x = array![[11.0, 12.0, 13.0], [21.0, 22.0, 23.0]];

        let fwd = prep.apply(x.view(), false).unwrap();
        let back = prep.apply_inverse(fwd.view(), false).unwrap();

        assert_eq!(fwd, array![[1.0, 2.0, 3.0], [1.0, 2.0, 3.0]]);
        assert_all_close(&back, &x);
    }

    #[test]
    // Purpose
    // -------
    // Ensure per-sample application matches the corresponding row of the
    // whole-sequence transform.
    //
    // Given
    // -----
    // - A z-score transform and a 2×2 sequence.
    //
    // Expect
    // ------
    // - `apply_sample(x[1])` equals `apply(x)[1]` bit-for-bit.
    fn apply_sample_matches_sequence_row() {
        let prep = Preprocessor::z_score(array![0.5, 1.5], array![2.0, 4.0]).unwrap();
        let x = array![[1.0, 2.0], [3.0, 4.0]];

        let whole = prep.apply(x.view(), true).unwrap();
        let single = prep.apply_sample(x.row(1)).unwrap();
        let inverse_single = prep.apply_inverse_sample(single.view()).unwrap();

        assert_eq!(single, whole.row(1));
        assert_relative_eq!(inverse_single[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(inverse_single[1], 4.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify that `None` and `Identity` both leave data unchanged.
    //
    // Given
    // -----
    // - An arbitrary 2×3 array.
    //
    // Expect
    // ------
    // - `apply_opt(None, ..)`, `apply_inverse_opt(None, ..)` and
    //   `Identity.apply` return the input exactly.
    fn absent_and_identity_transforms_are_noops() {
        let x = array![[1.0, -2.0, 3.5], [0.0, 4.0, -1.0]];
        let none: Option<&Preprocessor> = None;

        assert_eq!(apply_opt(none, x.view(), true).unwrap(), x);
        assert_eq!(apply_inverse_opt(none, x.view(), true).unwrap(), x);
        assert_eq!(apply_sample_opt(none, x.row(0)).unwrap(), x.row(0));
        assert_eq!(Preprocessor::identity().apply(x.view(), true).unwrap(), x);
        assert_eq!(Preprocessor::identity().n_channels(), None);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a transform rejects data whose channel count differs from its own.
    //
    // Given
    // -----
    // - A 2-channel mean removal and a 4×3 time-first array.
    //
    // Expect
    // ------
    // - `DimensionMismatch { expected: (4, 2), actual: (4, 3) }`.
    fn width_mismatch_is_reported() {
        let prep = Preprocessor::mean_removal(array![0.0, 0.0]).unwrap();
        let x = Array2::<f64>::zeros((4, 3));

        let err = prep.apply(x.view(), true).unwrap_err();

        assert_eq!(
            err,
            SSMError::DimensionMismatch {
                what: "transform input",
                expected: (4, 2),
                actual: (4, 3)
            }
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify constructor validation for z-score scales and means.
    //
    // Given
    // -----
    // - A zero scale, a NaN mean, and mismatched lengths.
    //
    // Expect
    // ------
    // - `InvalidTransform` for the first two (with the offending index) and
    //   `DimensionMismatch` for the last.
    fn zscore_constructor_rejects_bad_inputs() {
        let zero = Preprocessor::z_score(array![0.0, 0.0], array![1.0, 0.0]).unwrap_err();
        let nan = Preprocessor::z_score(array![f64::NAN], array![1.0]).unwrap_err();
        let len = Preprocessor::z_score(array![0.0, 0.0], array![1.0]).unwrap_err();

        assert!(matches!(zero, SSMError::InvalidTransform { index: 1, .. }));
        assert!(matches!(nan, SSMError::InvalidTransform { what: "mean", index: 0, .. }));
        assert!(matches!(len, SSMError::DimensionMismatch { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify `from_moments` picks the variant from the presence of a scale,
    // including the single-channel `(mean, std)` pair.
    //
    // Given
    // -----
    // - `([1.0], Some([2.0]))`, `([1.0, 2.0], None)`, and `([1.0], Some([0.0]))`.
    //
    // Expect
    // ------
    // - A 1-channel z-score, a 2-channel mean removal, and a scale error.
    fn from_moments_selects_variant() {
        let zscore = Preprocessor::from_moments(array![1.0], Some(array![2.0])).unwrap();
        let centred = Preprocessor::from_moments(array![1.0, 2.0], None).unwrap();
        let bad = Preprocessor::from_moments(array![1.0], Some(array![0.0])).unwrap_err();

        assert_eq!(zscore, Preprocessor::ZScore { mean: array![1.0], std: array![2.0] });
        assert_eq!(centred, Preprocessor::MeanRemoval { mean: array![1.0, 2.0] });
        assert_eq!(zscore.n_channels(), Some(1));
        assert!(matches!(bad, SSMError::InvalidTransform { what: "z-score scale", .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify the round trip over a generated grid of finite values, means,
    // and scales, in both layouts and per sample.
    //
    // Given
    // -----
    // - Means in {−1e8, −3.5, 0, 1e8}, scales in {1e-8, 0.5, 1, 1e6}.
    // - 64 pseudo-random values per channel spanning magnitudes 1e-6 … 1e9,
    //   both signs.
    //
    // Expect
    // ------
    // - `|inverse(apply(x)) − x| ≤ 4·ε·(|x| + |mean|)` for every entry, for
    //   z-score and mean removal alike.
    fn round_trip_holds_over_generated_values() {
        let means = [-1e8, -3.5, 0.0, 1e8];
        let scales = [1e-8, 0.5, 1.0, 1e6];
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let x = Array2::from_shape_fn((64, 2), |_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let frac = (state >> 11) as f64 / (1u64 << 53) as f64;
            let exponent = ((state >> 3) % 16) as i32 - 6;
            let sign = if state & 1 == 0 { 1.0 } else { -1.0 };
            sign * (0.5 + frac) * 10f64.powi(exponent)
        });

        for &m in &means {
            for &sd in &scales {
                let mean = array![m, -m];
                let preps = [
                    Preprocessor::z_score(mean.clone(), array![sd, 1.0 / sd]).unwrap(),
                    Preprocessor::mean_removal(mean.clone()).unwrap(),
                ];
                for prep in &preps {
                    let back_t = prep
                        .apply_inverse(prep.apply(x.view(), true).unwrap().view(), true)
                        .unwrap();
                    let xt = x.t().to_owned();
                    let back_c = prep
                        .apply_inverse(prep.apply(xt.view(), false).unwrap().view(), false)
                        .unwrap();
                    let row = x.row(17);
                    let back_s = prep
                        .apply_inverse_sample(prep.apply_sample(row).unwrap().view())
                        .unwrap();

                    for ((i, c), &v) in x.indexed_iter() {
                        let tol = 4.0 * f64::EPSILON * (v.abs() + m.abs());
                        assert!((back_t[[i, c]] - v).abs() <= tol, "time-first {v} {m} {sd}");
                        assert!((back_c[[c, i]] - v).abs() <= tol, "channels-first {v} {m} {sd}");
                    }
                    for (c, &v) in row.iter().enumerate() {
                        let tol = 4.0 * f64::EPSILON * (v.abs() + m.abs());
                        assert!((back_s[c] - v).abs() <= tol, "sample {v} {m} {sd}");
                    }
                }
            }
        }
    }
}
