use motex_core::{Condition, Point};

/// Pure pointer-space transform for one condition.
///
/// Decoupling translates by `-origin`; mirroring then reflects through the
/// arena center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualMapping {
    size: f64,
    mirror: bool,
    offset: Option<Point>,
}

impl VisualMapping {
    pub fn identity(size: f64) -> Self {
        Self {
            size,
            mirror: false,
            offset: None,
        }
    }

    pub fn for_condition(condition: &Condition, size: f64, decoupled_origin: Point) -> Self {
        Self {
            size,
            mirror: condition.mirror_transform,
            offset: condition.decoupled_mapping.then_some(decoupled_origin),
        }
    }

    pub fn is_identity(&self) -> bool {
        !self.mirror && self.offset.is_none()
    }

    pub fn apply(&self, p: Point) -> Point {
        let p = match self.offset {
            Some(origin) => Point::new(p.x - origin.x, p.y - origin.y),
            None => p,
        };
        if self.mirror {
            Point::new(self.size - p.x, self.size - p.y)
        } else {
            p
        }
    }

    /// Raw device position that [`apply`](Self::apply) maps onto `p`.
    pub fn invert(&self, p: Point) -> Point {
        let p = if self.mirror {
            Point::new(self.size - p.x, self.size - p.y)
        } else {
            p
        };
        match self.offset {
            Some(origin) => Point::new(p.x + origin.x, p.y + origin.y),
            None => p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_is_identity() {
        let m = VisualMapping::for_condition(&Condition::regular(), 350.0, Point::new(0.0, 350.0));
        assert!(m.is_identity());
        assert_eq!(m.apply(Point::new(12.0, 34.0)), Point::new(12.0, 34.0));
    }

    #[test]
    fn mirror_reflects_through_center() {
        let m = VisualMapping::for_condition(&Condition::mirror(), 350.0, Point::new(0.0, 350.0));
        assert_eq!(m.apply(Point::new(175.0, 175.0)), Point::new(175.0, 175.0));
        assert_eq!(m.apply(Point::new(325.0, 175.0)), Point::new(25.0, 175.0));
        assert_eq!(m.apply(Point::new(175.0, 25.0)), Point::new(175.0, 325.0));
    }

    #[test]
    fn decoupled_translates_then_mirrors() {
        let origin = Point::new(0.0, 350.0);
        let d = VisualMapping::for_condition(&Condition::decoupled(), 350.0, origin);
        assert_eq!(d.apply(Point::new(175.0, 525.0)), Point::new(175.0, 175.0));

        let dm = VisualMapping::for_condition(&Condition::decoupled_mirror(), 350.0, origin);
        assert_eq!(dm.apply(Point::new(25.0, 525.0)), Point::new(325.0, 175.0));
        assert_eq!(dm.invert(Point::new(325.0, 175.0)), Point::new(25.0, 525.0));
    }
}
