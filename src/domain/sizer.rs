//! Fixed-percentage-of-cash position sizer.

/// Allocates `perc` of available cash, in whole units of `margin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPercSizer {
    pub perc: f64,
    pub margin: f64,
}

impl FixedPercSizer {
    pub fn new(perc: f64, margin: f64) -> Self {
        FixedPercSizer { perc, margin }
    }

    /// floor(cash * perc / margin); 0 means "no trade this bar".
    pub fn size(&self, cash: f64) -> i64 {
        size(cash, self.perc, self.margin)
    }
}

pub fn size(cash: f64, perc: f64, margin_per_unit: f64) -> i64 {
    if !(cash > 0.0 && perc > 0.0 && margin_per_unit > 0.0) {
        return 0;
    }
    let units = (cash * perc / margin_per_unit).floor();
    if units < 1.0 || !units.is_finite() {
        return 0;
    }
    units as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_unit() {
        assert_eq!(size(500_000.0, 0.01, 5000.0), 1);
    }

    #[test]
    fn just_below_one_unit_floors_to_zero() {
        assert_eq!(size(499_999.0, 0.01, 5000.0), 0);
    }

    #[test]
    fn multiple_units_floor() {
        assert_eq!(size(1_234_567.0, 0.1, 5000.0), 24);
    }

    #[test]
    fn non_positive_inputs_yield_zero() {
        assert_eq!(size(0.0, 0.01, 5000.0), 0);
        assert_eq!(size(-10_000.0, 0.01, 5000.0), 0);
        assert_eq!(size(500_000.0, 0.0, 5000.0), 0);
        assert_eq!(size(500_000.0, -0.5, 5000.0), 0);
        assert_eq!(size(500_000.0, 0.01, 0.0), 0);
    }

    #[test]
    fn sizer_struct_delegates() {
        let sizer = FixedPercSizer::new(0.01, 5000.0);
        assert_eq!(sizer.size(1_000_000.0), 2);
        assert_eq!(sizer.size(499_999.0), 0);
    }
}
