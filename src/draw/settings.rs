use serde::{Deserialize, Serialize};

const DEFAULT_TIE_BREAK_BIAS: f64 = 0.001;
const DEFAULT_CURVE_STEP: f64 = 0.001;
const DEFAULT_SCALE_REFERENCE: f64 = 50.0;

/// Tunable constants used by the rasterizer and the handle-driven transforms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeometrySettings {
    /// Subtracted from ellipse coordinates before rounding so that `.5` ties
    /// always land on the lower pixel.
    #[serde(default = "default_tie_break_bias")]
    pub tie_break_bias: f64,
    /// Parameter increment for Bezier and B-spline sampling.
    #[serde(default = "default_curve_step")]
    pub curve_step: f64,
    /// Handle displacement that corresponds to a scale factor of 1.
    #[serde(default = "default_scale_reference")]
    pub scale_reference: f64,
}

fn default_tie_break_bias() -> f64 {
    DEFAULT_TIE_BREAK_BIAS
}

fn default_curve_step() -> f64 {
    DEFAULT_CURVE_STEP
}

fn default_scale_reference() -> f64 {
    DEFAULT_SCALE_REFERENCE
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            tie_break_bias: default_tie_break_bias(),
            curve_step: default_curve_step(),
            scale_reference: default_scale_reference(),
        }
    }
}

impl GeometrySettings {
    /// Replace values that would stall curve sampling or divide by zero.
    pub fn sanitize(&mut self) {
        if !(self.curve_step > 0.0 && self.curve_step <= 1.0) {
            tracing::warn!(
                curve_step = self.curve_step,
                "curve step out of range, using default"
            );
            self.curve_step = DEFAULT_CURVE_STEP;
        }
        if !(self.scale_reference.is_finite() && self.scale_reference > 0.0) {
            tracing::warn!(
                scale_reference = self.scale_reference,
                "scale reference must be positive, using default"
            );
            self.scale_reference = DEFAULT_SCALE_REFERENCE;
        }
        if !self.tie_break_bias.is_finite() {
            self.tie_break_bias = DEFAULT_TIE_BREAK_BIAS;
        }
    }

    /// Number of sampling intervals between `u = 0` and `u = 1`.
    pub fn curve_samples(&self) -> usize {
        (1.0 / self.curve_step).round().max(1.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::GeometrySettings;

    #[test]
    fn serde_roundtrip_geometry_settings() {
        let settings = GeometrySettings::default();
        let json = serde_json::to_string(&settings).expect("serialize geometry settings");
        let decoded: GeometrySettings =
            serde_json::from_str(&json).expect("deserialize geometry settings");
        assert_eq!(decoded, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let decoded: GeometrySettings =
            serde_json::from_str(r#"{"curve_step": 0.01}"#).expect("partial settings");
        assert_eq!(decoded.curve_step, 0.01);
        assert_eq!(decoded.tie_break_bias, 0.001);
        assert_eq!(decoded.scale_reference, 50.0);
        assert_eq!(decoded.curve_samples(), 100);
    }

    #[test]
    fn sanitize_rejects_degenerate_values() {
        let mut settings = GeometrySettings {
            tie_break_bias: f64::NAN,
            curve_step: 0.0,
            scale_reference: -3.0,
        };
        settings.sanitize();
        assert_eq!(settings, GeometrySettings::default());
    }

    #[test]
    fn default_curve_sampling_has_thousand_intervals() {
        assert_eq!(GeometrySettings::default().curve_samples(), 1000);
    }
}
