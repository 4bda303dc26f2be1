//! Thresholds used by the rules.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CheckError, CheckResult};

/// Configuration for a check run.
///
/// Every threshold the rules compare against lives here. The defaults match
/// the values asset pipelines have historically shipped with.
///
/// With the `serde` feature, a partial JSON document overrides only the
/// fields it names.
///
/// # Example
///
/// ```
/// use mesh_integrity::CheckParams;
///
/// // Use defaults
/// let params = CheckParams::default();
/// assert_eq!(params.max_pole_valence, 5);
///
/// // Or customize
/// let params = CheckParams::default()
///     .with_max_pole_valence(6)
///     .with_uv_u_range(0.0, 4.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CheckParams {
    /// Faces with area at or below this are zero-area.
    /// Default: `1e-8`
    pub zero_area_threshold: f64,

    /// Edges with length at or below this are zero-length.
    /// Default: `1e-8`
    pub zero_length_threshold: f64,

    /// Vertices with more incident edges than this are poles.
    /// Default: `5`
    pub max_pole_valence: usize,

    /// Lowest allowed U coordinate.
    /// Default: `0.0`
    pub uv_u_min: f64,

    /// Highest allowed U coordinate.
    /// Default: `10.0`
    pub uv_u_max: f64,

    /// Lowest allowed V coordinate. V has no upper bound.
    /// Default: `0.0`
    pub uv_v_min: f64,

    /// UVs closer than this to an integer lie on a tile border.
    /// Default: `1e-5`
    pub border_tolerance: f64,

    /// Shading group every shape is expected to use.
    /// Default: `"initialShadingGroup"`
    pub default_shading_group: String,

    /// Largest upstream history (shape included) that counts as clean.
    /// Default: `1`
    pub max_history_size: usize,
}

impl Default for CheckParams {
    fn default() -> Self {
        Self {
            zero_area_threshold: 1e-8,
            zero_length_threshold: 1e-8,
            max_pole_valence: 5,
            uv_u_min: 0.0,
            uv_u_max: 10.0,
            uv_v_min: 0.0,
            border_tolerance: 1e-5,
            default_shading_group: "initialShadingGroup".to_owned(),
            max_history_size: 1,
        }
    }
}

impl CheckParams {
    /// Set the zero-area face threshold.
    #[must_use]
    pub fn with_zero_area_threshold(mut self, threshold: f64) -> Self {
        self.zero_area_threshold = threshold;
        self
    }

    /// Set the zero-length edge threshold.
    #[must_use]
    pub fn with_zero_length_threshold(mut self, threshold: f64) -> Self {
        self.zero_length_threshold = threshold;
        self
    }

    /// Set the largest vertex valence that is not a pole.
    #[must_use]
    pub fn with_max_pole_valence(mut self, valence: usize) -> Self {
        self.max_pole_valence = valence;
        self
    }

    /// Set the allowed U range.
    #[must_use]
    pub fn with_uv_u_range(mut self, min: f64, max: f64) -> Self {
        self.uv_u_min = min;
        self.uv_u_max = max;
        self
    }

    /// Set the lowest allowed V coordinate.
    #[must_use]
    pub fn with_uv_v_min(mut self, min: f64) -> Self {
        self.uv_v_min = min;
        self
    }

    /// Set the tile border tolerance.
    #[must_use]
    pub fn with_border_tolerance(mut self, tolerance: f64) -> Self {
        self.border_tolerance = tolerance;
        self
    }

    /// Set the expected default shading group.
    #[must_use]
    pub fn with_default_shading_group(mut self, name: impl Into<String>) -> Self {
        self.default_shading_group = name.into();
        self
    }

    /// Set the largest clean history size.
    #[must_use]
    pub fn with_max_history_size(mut self, size: usize) -> Self {
        self.max_history_size = size;
        self
    }

    /// Check that every threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidParams`] for negative or non-finite
    /// tolerances, or an inverted U range.
    pub fn validate(&self) -> CheckResult<()> {
        let tolerances = [
            ("zero_area_threshold", self.zero_area_threshold),
            ("zero_length_threshold", self.zero_length_threshold),
            ("border_tolerance", self.border_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(CheckError::InvalidParams {
                    message: format!("{name} must be a finite, non-negative number, got {value}"),
                });
            }
        }

        if self.uv_u_min.is_nan() || self.uv_u_max.is_nan() || self.uv_v_min.is_nan() {
            return Err(CheckError::InvalidParams {
                message: "uv bounds must not be NaN".to_owned(),
            });
        }
        if self.uv_u_min > self.uv_u_max {
            return Err(CheckError::InvalidParams {
                message: format!(
                    "uv_u_min ({}) is greater than uv_u_max ({})",
                    self.uv_u_min, self.uv_u_max
                ),
            });
        }

        Ok(())
    }

    /// Parse parameters from JSON, filling unnamed fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Json`] for malformed input and
    /// [`CheckError::InvalidParams`] when the result fails [`validate`](Self::validate).
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_integrity::CheckParams;
    ///
    /// let params = CheckParams::from_json_str(r#"{ "uv_u_max": 1.0 }"#).unwrap();
    /// assert_eq!(params.uv_u_max, 1.0);
    /// assert_eq!(params.max_pole_valence, 5);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> CheckResult<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = CheckParams::default();
        assert!(params.validate().is_ok());
        assert!((params.border_tolerance - 1e-5).abs() < f64::EPSILON);
        assert_eq!(params.default_shading_group, "initialShadingGroup");
    }

    #[test]
    fn builder_methods() {
        let params = CheckParams::default()
            .with_zero_area_threshold(0.0)
            .with_zero_length_threshold(1e-4)
            .with_uv_v_min(-1.0)
            .with_border_tolerance(1e-3)
            .with_default_shading_group("lambert1SG")
            .with_max_history_size(2);

        assert!(params.zero_area_threshold.abs() < f64::EPSILON);
        assert!((params.uv_v_min + 1.0).abs() < f64::EPSILON);
        assert_eq!(params.default_shading_group, "lambert1SG");
        assert_eq!(params.max_history_size, 2);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let params = CheckParams::default().with_border_tolerance(-1.0);
        assert!(matches!(
            params.validate(),
            Err(CheckError::InvalidParams { .. })
        ));
    }

    #[test]
    fn nan_threshold_is_rejected() {
        let params = CheckParams::default().with_zero_area_threshold(f64::NAN);
        assert!(params.validate().is_err());
    }

    #[test]
    fn inverted_u_range_is_rejected() {
        let params = CheckParams::default().with_uv_u_range(5.0, 1.0);
        assert!(params.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let params =
            CheckParams::from_json_str(r#"{ "max_pole_valence": 7, "border_tolerance": 0.001 }"#)
                .unwrap();
        assert_eq!(params.max_pole_valence, 7);
        assert!((params.border_tolerance - 0.001).abs() < f64::EPSILON);
        assert!((params.uv_u_max - 10.0).abs() < f64::EPSILON);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn invalid_json_config_is_rejected() {
        assert!(matches!(
            CheckParams::from_json_str(r#"{ "border_tolerance": -2.0 }"#),
            Err(CheckError::InvalidParams { .. })
        ));
        assert!(matches!(
            CheckParams::from_json_str("not json"),
            Err(CheckError::Json(_))
        ));
    }
}
