//! Metric/imperial handling shared by the body calculators.

pub const LB_PER_KG: f64 = 2.204_622_621_8;
pub const KG_PER_LB: f64 = 0.453_592_37;
pub const CM_PER_IN: f64 = 2.54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Anything other than `imperial` reads as metric.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("imperial") {
            Self::Imperial
        } else {
            Self::Metric
        }
    }

    pub fn to_kg(self, weight: f64) -> f64 {
        match self {
            Self::Metric => weight,
            Self::Imperial => weight * KG_PER_LB,
        }
    }

    pub fn to_cm(self, length: f64) -> f64 {
        match self {
            Self::Metric => length,
            Self::Imperial => length * CM_PER_IN,
        }
    }

    pub fn to_inches(self, length: f64) -> f64 {
        match self {
            Self::Metric => length / CM_PER_IN,
            Self::Imperial => length,
        }
    }

    /// `70.0 kg` or `154.3 lb`
    pub fn weight(self, kg: f64) -> String {
        match self {
            Self::Metric => format!("{:.1} kg", kg),
            Self::Imperial => format!("{:.1} lb", kg * LB_PER_KG),
        }
    }
}

/// Positive finite measurement, otherwise the supplied message.
pub fn positive(value: f64, message: &str) -> crate::utils::error::Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(crate::utils::error::CalcError::invalid(message))
    }
}
