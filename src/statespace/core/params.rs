//! Canonical state-space parameters and their dimensions.
//!
//! Purpose
//! -------
//! Hold the identified matrices under fixed canonical names, validated once
//! so the predictor can rely on consistent nx / ny / nz / nu.
//!
//! Key behaviors
//! -------------
//! - [`SSMParams::new`] validates shapes of mandatory (`A`, `K`, `Cy`) and
//!   optional (`Cz`, `B`, `Dy`, `Dz`) matrices.
//! - [`SSMParams::from_record`] is the one-time migration from a
//!   [`ModelRecord`]: it resolves aliases, treats empty matrices as absent,
//!   and derives `Cz` from the legacy combined readout when needed.
//! - [`SSMDims`] reports the dimensions implied by the parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - `A` is nx×nx, `K` is nx×ny, `Cy` is ny×nx.
//! - `Cz`, when present, is nz×nx; `B` is nx×nu; `Dy` is ny×nu; `Dz` is nz×nu.
//! - An absent optional matrix contributes exactly zero to every prediction.
//!
//! Conventions
//! -----------
//! - Matrices are dense `Array2<f64>` in row-major math orientation (the
//!   readout maps a column state to a column output: `y = Cy·x`).
//! - The legacy combined readout is `(1 + nx)×nz`; `Cz` is its rows `1..`
//!   transposed.
//!
//! Testing notes
//! -------------
//! - Unit tests cover valid construction, each mandatory-parameter error,
//!   each shape error, empty-as-absent handling, and the legacy derivation.
use crate::statespace::{
    core::{
        record::{
            A_ALIASES, B_ALIASES, CY_ALIASES, CZ_ALIASES, DY_ALIASES, DZ_ALIASES, K_ALIASES,
            LEGACY_READOUT_ALIASES, ModelRecord,
        },
        validation::{infer_input_dim, validate_shape},
    },
    errors::{SSMError, SSMResult},
};
use ndarray::{Array2, s};

/// SSMDims — dimensions implied by a validated parameter set.
///
/// Fields
/// ------
/// - `nx`: latent state dimension.
/// - `ny`: primary observation channels.
/// - `nz`: behavior channels, `None` without `Cz` or `Dz`.
/// - `nu`: input channels, `None` without `B`, `Dy`, or `Dz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SSMDims {
    pub nx: usize,
    pub ny: usize,
    pub nz: Option<usize>,
    pub nu: Option<usize>,
}

/// SSMParams — canonical identified matrices.
///
/// Fields
/// ------
/// - `a`: `Array2<f64>` — state transition `A` (nx×nx).
/// - `k`: `Array2<f64>` — steady-state Kalman gain `K` (nx×ny).
/// - `cy`: `Array2<f64>` — primary readout `Cy` (ny×nx).
/// - `cz`: `Option<Array2<f64>>` — behavior readout `Cz` (nz×nx).
/// - `b`: `Option<Array2<f64>>` — input-to-state `B` (nx×nu).
/// - `dy`: `Option<Array2<f64>>` — primary feedthrough `Dy` (ny×nu).
/// - `dz`: `Option<Array2<f64>>` — behavior feedthrough `Dz` (nz×nu).
///
/// Invariants
/// ----------
/// - All shapes are mutually consistent; see the module docs. Guaranteed by
///   [`SSMParams::new`], the only constructor. A public matrix reassigned
///   afterwards is caught by [`SSMParams::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct SSMParams {
    pub a: Array2<f64>,
    pub k: Array2<f64>,
    pub cy: Array2<f64>,
    pub cz: Option<Array2<f64>>,
    pub b: Option<Array2<f64>>,
    pub dy: Option<Array2<f64>>,
    pub dz: Option<Array2<f64>>,
    dims: SSMDims,
}

impl SSMParams {
    /// Validate and bundle canonical matrices.
    ///
    /// Parameters
    /// ----------
    /// - `a`, `k`, `cy`: mandatory matrices.
    /// - `cz`, `b`, `dy`, `dz`: optional matrices; `None` means the term is zero.
    ///
    /// Returns
    /// -------
    /// `SSMResult<SSMParams>`
    ///   Validated parameters with cached [`SSMDims`].
    ///
    /// Errors
    /// ------
    /// - `SSMError::NonSquareTransition` if `A` is not square.
    /// - `SSMError::DimensionMismatch` if any other matrix disagrees with nx
    ///   (from `A`), ny (from `Cy`), nz (from `Cz`, else `Dz`), or nu (from the
    ///   first present of `B`, `Dy`, `Dz`).
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use rust_statespace::statespace::core::params::SSMParams;
    /// let params =
    ///     SSMParams::new(array![[0.5]], array![[0.2]], array![[1.0]], None, None, None, None)
    ///         .unwrap();
    /// assert_eq!(params.dims().nx, 1);
    /// assert_eq!(params.dims().nz, None);
    /// ```
    pub fn new(
        a: Array2<f64>, k: Array2<f64>, cy: Array2<f64>, cz: Option<Array2<f64>>,
        b: Option<Array2<f64>>, dy: Option<Array2<f64>>, dz: Option<Array2<f64>>,
    ) -> SSMResult<Self> {
        let dims = infer_dims(&a, &k, &cy, cz.as_ref(), b.as_ref(), dy.as_ref(), dz.as_ref())?;
        Ok(SSMParams { a, k, cy, cz, b, dy, dz, dims })
    }

    /// Resolve canonical parameters from a [`ModelRecord`].
    ///
    /// Behavior
    /// --------
    /// - Each canonical matrix is looked up through its alias table.
    /// - A resolved matrix with zero elements is treated as absent.
    /// - If `Cz` is absent and a legacy combined readout is present, `Cz` is
    ///   that matrix without its first row, transposed.
    ///
    /// Errors
    /// ------
    /// - `SSMError::MissingMandatoryParameter` if `A`, `K`, or `Cy` is absent.
    /// - `SSMError::LegacyReadoutTooShort` if the legacy readout has fewer
    ///   than two rows.
    /// - Any error of [`SSMParams::new`].
    pub fn from_record(record: &ModelRecord) -> SSMResult<Self> {
        let a = required(record, A_ALIASES, "A")?;
        let k = required(record, K_ALIASES, "K")?;
        let cy = required(record, CY_ALIASES, "Cy")?;
        let cz = match optional(record, CZ_ALIASES) {
            Some(cz) => Some(cz),
            None => optional(record, LEGACY_READOUT_ALIASES)
                .map(legacy_behavior_readout)
                .transpose()?,
        };
        let b = optional(record, B_ALIASES);
        let dy = optional(record, DY_ALIASES);
        let dz = optional(record, DZ_ALIASES);
        SSMParams::new(a, k, cy, cz, b, dy, dz)
    }

    pub fn dims(&self) -> SSMDims {
        self.dims
    }

    /// Re-check the current matrices and return the dimensions they imply.
    ///
    /// The matrices are public and may have been reassigned since
    /// construction, so the predictor calls this rather than
    /// [`SSMParams::dims`].
    ///
    /// Errors
    /// ------
    /// - Any shape error of [`SSMParams::new`].
    pub fn validate(&self) -> SSMResult<SSMDims> {
        infer_dims(
            &self.a,
            &self.k,
            &self.cy,
            self.cz.as_ref(),
            self.b.as_ref(),
            self.dy.as_ref(),
            self.dz.as_ref(),
        )
    }
}

// ---- Helper Methods ----

fn infer_dims(
    a: &Array2<f64>, k: &Array2<f64>, cy: &Array2<f64>, cz: Option<&Array2<f64>>,
    b: Option<&Array2<f64>>, dy: Option<&Array2<f64>>, dz: Option<&Array2<f64>>,
) -> SSMResult<SSMDims> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(SSMError::NonSquareTransition { rows, cols });
    }
    let nx = rows;
    let ny = cy.nrows();
    validate_shape("Cy", cy, (ny, nx))?;
    validate_shape("K", k, (nx, ny))?;

    let nz = cz.or(dz).map(|m| m.nrows());
    if let (Some(cz), Some(nz)) = (cz, nz) {
        validate_shape("Cz", cz, (nz, nx))?;
    }

    let nu = infer_input_dim(b, dy, dz)?;
    if let Some(nu) = nu {
        if let Some(b) = b {
            validate_shape("B", b, (nx, nu))?;
        }
        if let Some(dy) = dy {
            validate_shape("Dy", dy, (ny, nu))?;
        }
        if let (Some(dz), Some(nz)) = (dz, nz) {
            validate_shape("Dz", dz, (nz, nu))?;
        }
    }

    Ok(SSMDims { nx, ny, nz, nu })
}

fn optional(record: &ModelRecord, aliases: &[&str]) -> Option<Array2<f64>> {
    record.matrix(aliases).filter(|m| !m.is_empty()).cloned()
}

fn required(
    record: &ModelRecord, aliases: &[&str], name: &'static str,
) -> SSMResult<Array2<f64>> {
    optional(record, aliases).ok_or(SSMError::MissingMandatoryParameter { name })
}

/// Drop the first row of the legacy combined readout and transpose.
fn legacy_behavior_readout(combined: Array2<f64>) -> SSMResult<Array2<f64>> {
    if combined.nrows() < 2 {
        return Err(SSMError::LegacyReadoutTooShort { rows: combined.nrows() });
    }
    Ok(combined.slice(s![1.., ..]).t().to_owned())
}
