//! Discrete color classification and legend data.

use serde::Serialize;
use wxd_core::Attribute;

use crate::error::{InterpolationError, Result};

/// Ordered low-to-high palette with at least two colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorRamp(Vec<String>);

impl ColorRamp {
    pub fn new<S: Into<String>>(colors: impl IntoIterator<Item = S>) -> Result<Self> {
        let colors: Vec<String> = colors.into_iter().map(Into::into).collect();
        if colors.len() < 2 {
            return Err(InterpolationError::InvalidParameter {
                name: "ramp",
                value: colors.len().to_string(),
                reason: "a color ramp needs at least 2 colors".into(),
            });
        }
        Ok(Self(colors))
    }

    /// The static ramp configured for `attribute`.
    pub fn for_attribute(attribute: Attribute) -> Self {
        Self(
            attribute
                .ramp_colors()
                .iter()
                .map(|color| color.to_string())
                .collect(),
        )
    }

    pub fn colors(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Index into a ramp of `ramp_len` colors for `value` within `[min_value, max_value]`.
///
/// Values outside the range clamp to the ends. A flat range (and a NaN
/// value) maps to index 0.
pub fn class_index(value: f64, min_value: f64, max_value: f64, ramp_len: usize) -> usize {
    let last = ramp_len.saturating_sub(1);
    let span = max_value - min_value;
    let ratio = if span == 0.0 || !span.is_finite() {
        0.0
    } else {
        ((value - min_value) / span).clamp(0.0, 1.0)
    };
    // NaN casts to 0
    ((ratio * last as f64).floor() as usize).min(last)
}

/// Color for `value` within `[min_value, max_value]`.
pub fn classify<'a>(value: f64, min_value: f64, max_value: f64, ramp: &'a ColorRamp) -> &'a str {
    &ramp.0[class_index(value, min_value, max_value, ramp.len())]
}

/// Everything a renderer needs to draw a legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub attribute: Attribute,
    pub label: String,
    pub gradient_stops: ColorRamp,
    pub min_label: String,
    pub max_label: String,
}

pub fn legend(attribute: Attribute, min_value: f64, max_value: f64, ramp: &ColorRamp) -> Legend {
    Legend {
        attribute,
        label: attribute.label().to_string(),
        gradient_stops: ramp.clone(),
        min_label: format!("{min_value:.1}"),
        max_label: format!("{max_value:.1}"),
    }
}

/// A location marker colored by its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColoredMarker {
    pub id: String,
    pub value: f64,
    pub color: String,
}

/// Color a set of per-location values against their own range.
///
/// Returns the markers in input order plus the `(min, max)` range used,
/// or `None` for an empty input.
pub fn color_markers(
    values: &[(String, f64)],
    ramp: &ColorRamp,
) -> Option<(Vec<ColoredMarker>, (f64, f64))> {
    if values.is_empty() {
        return None;
    }
    let (min_value, max_value) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        });
    let markers = values
        .iter()
        .map(|(id, value)| ColoredMarker {
            id: id.clone(),
            value: *value,
            color: classify(*value, min_value, max_value, ramp).to_string(),
        })
        .collect();
    Some((markers, (min_value, max_value)))
}
