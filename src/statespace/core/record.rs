//! Model records and alias-based parameter resolution.
//!
//! Purpose
//! -------
//! Represent an identified model as it arrives from the fitting side — a bag
//! of named matrices and preprocessing transforms whose names depend on which
//! version of the fitting procedure produced it — and resolve those names to
//! the canonical parameters used by the predictor.
//!
//! Key behaviors
//! -------------
//! - [`ModelRecord`] stores named matrices and named transforms.
//! - [`resolve_field`] returns the first present value over an ordered alias
//!   list; [`resolve_field_or`] falls back to a caller-supplied default.
//! - The `*_ALIASES` tables fix the accepted names and their priority.
//!
//! Invariants & assumptions
//! ------------------------
//! - Resolution is strict left-to-right priority with exact name matching;
//!   there is no partial or case-insensitive matching.
//! - Lookup is pure: no field is moved, renamed, or mutated.
//!
//! Downstream usage
//! ----------------
//! - `SSMParams::from_record` and `SSMModel::from_record` run the resolver
//!   once per model; nothing past model construction sees an alias.
use crate::statespace::core::transforms::Preprocessor;
use ndarray::Array2;
use std::collections::BTreeMap;

/// Accepted names for the state-transition matrix `A`.
pub const A_ALIASES: &[&str] = &["a", "A"];
/// Accepted names for the steady-state Kalman gain `K`.
pub const K_ALIASES: &[&str] = &["k", "K"];
/// Accepted names for the primary readout `Cy`.
pub const CY_ALIASES: &[&str] = &["Cy", "C", "c"];
/// Accepted names for the behavior readout `Cz`.
pub const CZ_ALIASES: &[&str] = &["Cz", "cz"];
/// Accepted names for the legacy combined readout (`Cz` stacked below one
/// extra row, transposed).
pub const LEGACY_READOUT_ALIASES: &[&str] = &["T"];
/// Accepted names for the input-to-state matrix `B`.
pub const B_ALIASES: &[&str] = &["B", "b"];
/// Accepted names for the primary feedthrough `Dy`.
pub const DY_ALIASES: &[&str] = &["Dy", "D", "d"];
/// Accepted names for the behavior feedthrough `Dz`.
pub const DZ_ALIASES: &[&str] = &["Dz", "dz"];
/// Accepted names for the observation preprocessing transform.
pub const Y_PREP_ALIASES: &[&str] = &["YPrepModel", "y_prep_model"];
/// Accepted names for the behavior preprocessing transform.
pub const Z_PREP_ALIASES: &[&str] = &["ZPrepModel", "z_prep_model"];
/// Accepted names for the input preprocessing transform.
pub const U_PREP_ALIASES: &[&str] = &["UPrepModel", "u_prep_model"];

/// ModelRecord — named fields of an identified model, before migration.
///
/// Fields
/// ------
/// - `matrices`: `BTreeMap<String, Array2<f64>>`
///   Matrix-valued fields keyed by whatever name the producer used. Vectors
///   are stored as single-row or single-column matrices.
/// - `transforms`: `BTreeMap<String, Preprocessor>`
///   Preprocessing transforms keyed by name.
///
/// Notes
/// -----
/// - A present field holding a matrix with zero elements is how producers
///   mark a term as absent; the migration step treats it as such.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRecord {
    pub matrices: BTreeMap<String, Array2<f64>>,
    pub transforms: BTreeMap<String, Preprocessor>,
}

impl ModelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a matrix field.
    pub fn with_matrix(mut self, name: impl Into<String>, value: Array2<f64>) -> Self {
        self.matrices.insert(name.into(), value);
        self
    }

    /// Builder-style insertion of a transform field.
    pub fn with_transform(mut self, name: impl Into<String>, value: Preprocessor) -> Self {
        self.transforms.insert(name.into(), value);
        self
    }

    /// Insert a matrix field, returning any value previously stored under `name`.
    pub fn insert_matrix(
        &mut self, name: impl Into<String>, value: Array2<f64>,
    ) -> Option<Array2<f64>> {
        self.matrices.insert(name.into(), value)
    }

    /// Insert a transform field, returning any value previously stored under `name`.
    pub fn insert_transform(
        &mut self, name: impl Into<String>, value: Preprocessor,
    ) -> Option<Preprocessor> {
        self.transforms.insert(name.into(), value)
    }

    /// First matrix present under any of `aliases`.
    pub fn matrix(&self, aliases: &[&str]) -> Option<&Array2<f64>> {
        resolve_field(&self.matrices, aliases)
    }

    /// First transform present under any of `aliases`.
    pub fn transform(&self, aliases: &[&str]) -> Option<&Preprocessor> {
        resolve_field(&self.transforms, aliases)
    }
}

/// Return the first value stored under one of `aliases`, in priority order.
///
/// Parameters
/// ----------
/// - `fields`: `&BTreeMap<String, T>`
///   Named fields of a record.
/// - `aliases`: `&[&str]`
///   Acceptable names, highest priority first.
///
/// Returns
/// -------
/// `Option<&T>`
///   - `Some(value)` for the left-most alias present in `fields`.
///   - `None` if no alias is present.
///
/// Examples
/// --------
/// ```rust
/// # use std::collections::BTreeMap;
/// # use rust_statespace::statespace::core::record::resolve_field;
/// let mut fields = BTreeMap::new();
/// fields.insert("A".to_string(), 2);
/// fields.insert("a".to_string(), 1);
/// assert_eq!(resolve_field(&fields, &["a", "A"]), Some(&1));
/// assert_eq!(resolve_field(&fields, &["x"]), None);
/// ```
pub fn resolve_field<'a, T>(fields: &'a BTreeMap<String, T>, aliases: &[&str]) -> Option<&'a T> {
    aliases.iter().find_map(|name| fields.get(*name))
}

/// Like [`resolve_field`], returning `default` when no alias is present.
pub fn resolve_field_or<'a, T>(
    fields: &'a BTreeMap<String, T>, aliases: &[&str], default: &'a T,
) -> &'a T {
    resolve_field(fields, aliases).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Left-to-right alias priority and exact matching in `resolve_field`.
    // - Default fallback in `resolve_field_or`.
    // - The `ModelRecord` builder and typed lookups.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that the left-most present alias wins even when later aliases
    // are also present.
    //
    // Given
    // -----
    // - Fields `"A"` and `"a"` holding different matrices.
    //
    // Expect
    // ------
    // - Aliases `["a", "A"]` resolve to the `"a"` matrix.
    // - Aliases `["A", "a"]` resolve to the `"A"` matrix.
    fn resolve_field_respects_alias_priority() {
        let record = ModelRecord::new()
            .with_matrix("A", array![[2.0]])
            .with_matrix("a", array![[1.0]]);

        assert_eq!(record.matrix(&["a", "A"]), Some(&array![[1.0]]));
        assert_eq!(record.matrix(&["A", "a"]), Some(&array![[2.0]]));
    }

    #[test]
    // Purpose
    // -------
    // Ensure there is no partial or prefix matching.
    //
    // Given
    // -----
    // - A single field named `"Cy_old"`.
    //
    // Expect
    // ------
    // - `CY_ALIASES` resolve to `None`.
    fn resolve_field_requires_exact_names() {
        let record = ModelRecord::new().with_matrix("Cy_old", array![[1.0]]);

        assert!(record.matrix(CY_ALIASES).is_none());
    }

    #[test]
    // Purpose
    // -------
    // Verify that `resolve_field_or` returns the caller's default only when no
    // alias is present.
    //
    // Given
    // -----
    // - A map with key `"k"`.
    //
    // Expect
    // ------
    // - `K_ALIASES` resolve to the stored value; `B_ALIASES` to the default.
    fn resolve_field_or_falls_back_to_default() {
        let mut fields = BTreeMap::new();
        fields.insert("k".to_string(), 7_i32);
        let default = -1;

        assert_eq!(*resolve_field_or(&fields, K_ALIASES, &default), 7);
        assert_eq!(*resolve_field_or(&fields, B_ALIASES, &default), -1);
    }

    #[test]
    // Purpose
    // -------
    // Verify that `insert_*` report replaced values and transforms resolve by alias.
    //
    // Given
    // -----
    // - Two insertions under `"B"` and one transform under `"y_prep_model"`.
    //
    // Expect
    // ------
    // - The second insertion returns the first matrix.
    // - `Y_PREP_ALIASES` find the transform.
    fn insert_and_transform_lookup() {
        let mut record = ModelRecord::new();

        assert!(record.insert_matrix("B", array![[1.0]]).is_none());
        assert_eq!(record.insert_matrix("B", array![[2.0]]), Some(array![[1.0]]));
        assert!(record.insert_transform("y_prep_model", Preprocessor::identity()).is_none());
        assert_eq!(record.transform(Y_PREP_ALIASES), Some(&Preprocessor::Identity));
        assert!(record.transform(Z_PREP_ALIASES).is_none());
    }
}
