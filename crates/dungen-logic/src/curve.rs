//! Connection chance curves.
//!
//! A curve maps the fraction of a tile's sockets that are already connected
//! (0.0 to 1.0) to the probability of attempting one more connection. Values
//! are returned exactly as the curve defines them; nothing clamps or decays
//! them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single curve sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub t: f32,
    pub value: f32,
}

impl Keyframe {
    pub fn new(t: f32, value: f32) -> Self {
        Self { t, value }
    }
}

/// Programmatic curve supplied by the caller.
#[derive(Clone)]
pub struct CurveFn(pub Arc<dyn Fn(f32) -> f32 + Send + Sync>);

impl fmt::Debug for CurveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CurveFn(..)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChanceCurve {
    Constant {
        value: f32,
    },
    Linear {
        start: f32,
        end: f32,
    },
    /// Piecewise linear through `points`, held flat past either end.
    Keyframes {
        points: Vec<Keyframe>,
    },
    #[serde(skip)]
    Custom(CurveFn),
}

impl Default for ChanceCurve {
    fn default() -> Self {
        ChanceCurve::Constant { value: 0.5 }
    }
}

impl ChanceCurve {
    pub fn constant(value: f32) -> Self {
        ChanceCurve::Constant { value }
    }

    pub fn linear(start: f32, end: f32) -> Self {
        ChanceCurve::Linear { start, end }
    }

    /// Build a keyframed curve; points are sorted by `t`.
    pub fn keyframes(mut points: Vec<Keyframe>) -> Self {
        points.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));
        ChanceCurve::Keyframes { points }
    }

    pub fn custom(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        ChanceCurve::Custom(CurveFn(Arc::new(f)))
    }

    pub fn evaluate(&self, fraction: f32) -> f32 {
        match self {
            ChanceCurve::Constant { value } => *value,
            ChanceCurve::Linear { start, end } => start + (end - start) * fraction,
            ChanceCurve::Keyframes { points } => sample_keyframes(points, fraction),
            ChanceCurve::Custom(f) => (f.0)(fraction),
        }
    }

    /// Structural problems that make the curve unusable.
    pub fn problem(&self) -> Option<&'static str> {
        match self {
            ChanceCurve::Constant { value } if !value.is_finite() => Some("constant is not finite"),
            ChanceCurve::Linear { start, end } if !start.is_finite() || !end.is_finite() => {
                Some("linear endpoints are not finite")
            }
            ChanceCurve::Keyframes { points } if points.is_empty() => Some("keyframes are empty"),
            ChanceCurve::Keyframes { points }
                if points.iter().any(|k| !k.t.is_finite() || !k.value.is_finite()) =>
            {
                Some("keyframes contain non-finite values")
            }
            ChanceCurve::Keyframes { points } if points.windows(2).any(|w| w[1].t < w[0].t) => {
                Some("keyframes are not sorted by t")
            }
            _ => None,
        }
    }
}

fn sample_keyframes(points: &[Keyframe], t: f32) -> f32 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };
    if t <= first.t {
        return first.value;
    }
    if t >= last.t {
        return last.value;
    }
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.t && t <= b.t {
            let span = b.t - a.t;
            if span <= 0.0 {
                return b.value;
            }
            return a.value + (b.value - a.value) * ((t - a.t) / span);
        }
    }
    last.value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_and_linear() {
        assert_eq!(ChanceCurve::constant(0.3).evaluate(0.9), 0.3);
        let falling = ChanceCurve::linear(1.0, 0.0);
        assert!((falling.evaluate(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_keyframes_interpolate_and_clamp_domain() {
        let curve = ChanceCurve::keyframes(vec![
            Keyframe::new(1.0, 0.0),
            Keyframe::new(0.0, 1.0),
            Keyframe::new(0.5, 0.8),
        ]);
        assert_eq!(curve.evaluate(-1.0), 1.0);
        assert!((curve.evaluate(0.25) - 0.9).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.4).abs() < 1e-6);
        assert_eq!(curve.evaluate(2.0), 0.0);
    }

    #[test]
    fn test_values_are_not_clamped() {
        // out-of-range probabilities are honored as given
        let curve = ChanceCurve::linear(1.5, -0.5);
        assert_eq!(curve.evaluate(0.0), 1.5);
        assert_eq!(curve.evaluate(1.0), -0.5);
    }

    #[test]
    fn test_custom_curve() {
        let curve = ChanceCurve::custom(|f| 1.0 - f * f);
        assert!((curve.evaluate(0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_curve_json_shape() {
        let curve: ChanceCurve =
            serde_json::from_str(r#"{"kind":"linear","start":1.0,"end":0.2}"#).unwrap();
        assert!((curve.evaluate(1.0) - 0.2).abs() < 1e-6);
        assert!(ChanceCurve::keyframes(vec![]).problem().is_some());
        assert!(ChanceCurve::default().problem().is_none());
    }
}
