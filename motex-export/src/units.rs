use motex_core::UnitConverter;

/// Unit system of an artifact: millimetres when calibrated, pixels otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Units {
    Pixels,
    Physical(UnitConverter),
}

impl Units {
    pub fn from_converter(converter: Option<&UnitConverter>) -> Self {
        converter.map_or(Self::Pixels, |c| Self::Physical(*c))
    }

    pub fn length_label(&self) -> &'static str {
        match self {
            Self::Pixels => "px",
            Self::Physical(_) => "mm",
        }
    }

    pub fn velocity_label(&self) -> &'static str {
        match self {
            Self::Pixels => "px/ms",
            Self::Physical(_) => "mm/s",
        }
    }

    pub fn acceleration_label(&self) -> &'static str {
        match self {
            Self::Pixels => "px/ms²",
            Self::Physical(_) => "mm/s²",
        }
    }

    pub fn length(&self, px: f64) -> f64 {
        match self {
            Self::Pixels => px,
            Self::Physical(c) => c.px_to_mm(px),
        }
    }

    pub fn velocity(&self, px_per_ms: f64) -> f64 {
        match self {
            Self::Pixels => px_per_ms,
            Self::Physical(c) => c.px_per_ms_to_mm_per_s(px_per_ms),
        }
    }

    pub fn acceleration(&self, px_per_ms2: f64) -> f64 {
        match self {
            Self::Pixels => px_per_ms2,
            Self::Physical(c) => c.px_per_ms2_to_mm_per_s2(px_per_ms2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_units_convert() {
        let units = Units::from_converter(Some(&UnitConverter::new(2.0).unwrap()));
        assert_eq!(units.length_label(), "mm");
        assert_eq!(units.length(10.0), 5.0);
        assert_eq!(units.velocity(1.0), 500.0);
        assert_eq!(units.acceleration(1.0), 500_000.0);
    }

    #[test]
    fn pixel_units_pass_through() {
        let units = Units::from_converter(None);
        assert_eq!(units.velocity_label(), "px/ms");
        assert_eq!(units.length(10.0), 10.0);
    }
}
