use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Long edge of an ID-1 card, the usual on-screen calibration reference.
pub const CREDIT_CARD_LENGTH_MM: f64 = 85.6;

/// Linear scale between screen pixels and millimetres.
///
/// Path velocities are kept in px/ms and accelerations in px/ms²; the
/// physical helpers report mm/s and mm/s².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitConverter {
    pixels_per_mm: f64,
}

impl UnitConverter {
    pub fn new(pixels_per_mm: f64) -> Result<Self, CoreError> {
        if pixels_per_mm.is_finite() && pixels_per_mm > 0.0 {
            Ok(Self { pixels_per_mm })
        } else {
            Err(CoreError::InvalidCalibration(pixels_per_mm))
        }
    }

    /// Calibrates from an on-screen line of `reference_px` matched against
    /// a physical length of `reference_mm`.
    pub fn from_reference(reference_px: f64, reference_mm: f64) -> Result<Self, CoreError> {
        if !(reference_mm.is_finite() && reference_mm > 0.0) {
            return Err(CoreError::InvalidCalibration(reference_mm));
        }
        Self::new(reference_px / reference_mm)
    }

    pub fn pixels_per_mm(&self) -> f64 {
        self.pixels_per_mm
    }

    pub fn px_to_mm(&self, px: f64) -> f64 {
        px / self.pixels_per_mm
    }

    pub fn mm_to_px(&self, mm: f64) -> f64 {
        mm * self.pixels_per_mm
    }

    pub fn px_per_ms_to_mm_per_s(&self, px_per_ms: f64) -> f64 {
        self.px_to_mm(px_per_ms * 1_000.0)
    }

    pub fn mm_per_s_to_px_per_ms(&self, mm_per_s: f64) -> f64 {
        self.mm_to_px(mm_per_s) / 1_000.0
    }

    pub fn px_per_ms2_to_mm_per_s2(&self, px_per_ms2: f64) -> f64 {
        self.px_to_mm(px_per_ms2 * 1_000_000.0)
    }

    pub fn mm_per_s2_to_px_per_ms2(&self, mm_per_s2: f64) -> f64 {
        self.mm_to_px(mm_per_s2) / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_card_calibration() {
        let converter = UnitConverter::from_reference(342.4, CREDIT_CARD_LENGTH_MM).unwrap();
        assert!((converter.pixels_per_mm() - 4.0).abs() < 1e-9);
        assert!((converter.px_to_mm(40.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(UnitConverter::new(0.0).is_err());
        assert!(UnitConverter::new(-2.0).is_err());
        assert!(UnitConverter::new(f64::NAN).is_err());
        assert!(UnitConverter::from_reference(300.0, 0.0).is_err());
    }

    #[test]
    fn velocity_and_acceleration_scale() {
        let converter = UnitConverter::new(2.0).unwrap();
        // 1 px/ms = 1000 px/s = 500 mm/s
        assert!((converter.px_per_ms_to_mm_per_s(1.0) - 500.0).abs() < 1e-9);
        assert!((converter.px_per_ms2_to_mm_per_s2(1.0) - 500_000.0).abs() < 1e-6);
        assert!((converter.mm_per_s_to_px_per_ms(500.0) - 1.0).abs() < 1e-12);
        assert!((converter.mm_per_s2_to_px_per_ms2(500_000.0) - 1.0).abs() < 1e-12);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mm_px_round_trip(ppm in 0.5f64..20.0, value in -10_000.0f64..10_000.0) {
                let converter = UnitConverter::new(ppm).unwrap();
                let back = converter.px_to_mm(converter.mm_to_px(value));
                prop_assert!((back - value).abs() <= 1e-9 * value.abs().max(1.0));
            }
        }
    }
}
