use crate::api::{Confidence, ConfidenceLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeTier {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceGauge {
    pub percentage: u8,
    pub tier: GaugeTier,
}

/// Coarse bucketing only: Large 100, Medium 60, everything else 30.
pub fn map_confidence_to_gauge(confidence: &Confidence) -> ConfidenceGauge {
    let percentage = gauge_percentage(&confidence.label);
    ConfidenceGauge {
        percentage,
        tier: gauge_tier(percentage),
    }
}

pub fn gauge_percentage(label: &ConfidenceLabel) -> u8 {
    match label {
        ConfidenceLabel::Large => 100,
        ConfidenceLabel::Medium => 60,
        ConfidenceLabel::Small | ConfidenceLabel::Other(_) => 30,
    }
}

pub fn gauge_tier(percentage: u8) -> GaugeTier {
    if percentage >= 70 {
        GaugeTier::Success
    } else if percentage >= 40 {
        GaugeTier::Warning
    } else {
        GaugeTier::Danger
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentDirection {
    Positive,
    Negative,
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakdown {
    pub base_share: f64,
    pub adjustment_share: f64,
    pub direction: AdjustmentDirection,
}

impl Breakdown {
    pub fn base_width_pct(&self, predicted: f64) -> f64 {
        share_width_pct(self.base_share, predicted)
    }

    pub fn adjustment_width_pct(&self, predicted: f64) -> f64 {
        share_width_pct(self.adjustment_share, predicted)
    }
}

pub fn map_breakdown(predicted: f64, model_base: f64) -> Breakdown {
    let adjustment = predicted - model_base;
    let direction = if adjustment.abs() < f64::EPSILON || !adjustment.is_finite() {
        AdjustmentDirection::Zero
    } else if adjustment > 0.0 {
        AdjustmentDirection::Positive
    } else {
        AdjustmentDirection::Negative
    };
    Breakdown {
        base_share: model_base,
        adjustment_share: if adjustment.is_finite() {
            adjustment.abs()
        } else {
            0.0
        },
        direction,
    }
}

/// Bar width of `value` as a share of `predicted`, in [0, 100]. A zero or
/// non-finite prediction renders as an empty bar.
pub fn share_width_pct(value: f64, predicted: f64) -> f64 {
    if predicted == 0.0 || !predicted.is_finite() || !value.is_finite() {
        return 0.0;
    }
    let pct = value / predicted * 100.0;
    if pct.is_finite() {
        pct.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn trend_text(pts_trend: f64) -> String {
    let arrow = if pts_trend > 0.0 { '↑' } else { '↓' };
    format!("{arrow} {pts_trend:.1}")
}

pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "--".to_string(),
    }
}
