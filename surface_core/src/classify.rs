//! Shape and material labels derived from scan dispersion.
use std::fmt;
use std::sync::Arc;

use surface_traits::{AbsorptionLevel, AbsorptionModel};

use crate::config::CalibrationTable;

/// Surface shape, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeLabel {
    Flat,
    SlightlyCurved,
    CurvedIrregular,
}

impl ShapeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeLabel::Flat => "Flat Surface",
            ShapeLabel::SlightlyCurved => "Slightly Curved",
            ShapeLabel::CurvedIrregular => "Curved / Irregular",
        }
    }
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialLabel {
    Absorbing,
    Reflective,
}

impl MaterialLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialLabel::Absorbing => "Absorbing",
            MaterialLabel::Reflective => "Reflective",
        }
    }
}

impl fmt::Display for MaterialLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AbsorptionLevel> for MaterialLabel {
    fn from(level: AbsorptionLevel) -> Self {
        match level {
            AbsorptionLevel::High => MaterialLabel::Absorbing,
            AbsorptionLevel::Low => MaterialLabel::Reflective,
        }
    }
}

/// Single-threshold absorption model: strictly above `threshold` is `High`.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdAbsorption {
    pub threshold: f64,
}

impl ThresholdAbsorption {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl AbsorptionModel for ThresholdAbsorption {
    fn absorption_level(&self, sigma: f64) -> AbsorptionLevel {
        if sigma > self.threshold {
            AbsorptionLevel::High
        } else {
            AbsorptionLevel::Low
        }
    }
}

/// Stateless classifier over an injected calibration table.
///
/// Both functions are total: every sigma, including NaN, maps to a label
/// (NaN fails every `<` comparison and lands in the most severe band).
#[derive(Clone)]
pub struct Classifier {
    table: CalibrationTable,
    absorption: Arc<dyn AbsorptionModel + Send + Sync>,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(CalibrationTable::default())
    }
}

impl Classifier {
    /// Classifier whose material rule is `ThresholdAbsorption(table.absorption_threshold)`.
    pub fn new(table: CalibrationTable) -> Self {
        let absorption = Arc::new(ThresholdAbsorption::new(table.absorption_threshold));
        Self { table, absorption }
    }

    pub fn with_absorption(
        table: CalibrationTable,
        absorption: Arc<dyn AbsorptionModel + Send + Sync>,
    ) -> Self {
        Self { table, absorption }
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Left-closed, right-open bands: `[0, flat)`, `[flat, slight)`, `[slight, ∞)`.
    pub fn classify_shape(&self, sigma: f64) -> ShapeLabel {
        if sigma < self.table.flat_max_sigma {
            ShapeLabel::Flat
        } else if sigma < self.table.slightly_curved_max_sigma {
            ShapeLabel::SlightlyCurved
        } else {
            ShapeLabel::CurvedIrregular
        }
    }

    pub fn classify_material(&self, sigma: f64) -> MaterialLabel {
        self.absorption.absorption_level(sigma).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, ShapeLabel::Flat)]
    #[case(0.1749, ShapeLabel::Flat)]
    #[case(0.175, ShapeLabel::SlightlyCurved)]
    #[case(0.2039, ShapeLabel::SlightlyCurved)]
    #[case(0.204, ShapeLabel::CurvedIrregular)]
    #[case(3.0, ShapeLabel::CurvedIrregular)]
    #[case(f64::NAN, ShapeLabel::CurvedIrregular)]
    fn shape_bands(#[case] sigma: f64, #[case] expected: ShapeLabel) {
        assert_eq!(Classifier::default().classify_shape(sigma), expected);
    }

    #[rstest]
    #[case(0.0, MaterialLabel::Reflective)]
    #[case(0.096, MaterialLabel::Reflective)]
    #[case(0.0961, MaterialLabel::Absorbing)]
    #[case(1.0, MaterialLabel::Absorbing)]
    fn material_threshold_is_strict(#[case] sigma: f64, #[case] expected: MaterialLabel) {
        assert_eq!(Classifier::default().classify_material(sigma), expected);
    }

    #[test]
    fn alternate_table_moves_bands() {
        let c = Classifier::new(CalibrationTable {
            flat_max_sigma: 0.5,
            slightly_curved_max_sigma: 1.0,
            absorption_threshold: 0.3,
        });
        assert_eq!(c.classify_shape(0.3), ShapeLabel::Flat);
        assert_eq!(c.classify_shape(0.7), ShapeLabel::SlightlyCurved);
        assert_eq!(c.classify_material(0.2), MaterialLabel::Reflective);
    }

    struct AlwaysHigh;
    impl AbsorptionModel for AlwaysHigh {
        fn absorption_level(&self, _sigma: f64) -> AbsorptionLevel {
            AbsorptionLevel::High
        }
    }

    #[test]
    fn material_delegates_to_model() {
        let c = Classifier::with_absorption(CalibrationTable::default(), Arc::new(AlwaysHigh));
        assert_eq!(c.classify_material(0.0), MaterialLabel::Absorbing);
    }

    #[test]
    fn labels_render_like_the_dashboard() {
        assert_eq!(ShapeLabel::CurvedIrregular.to_string(), "Curved / Irregular");
        assert_eq!(MaterialLabel::Reflective.to_string(), "Reflective");
    }
}
