use std::fmt::{Display, Formatter};

/// A static evaluation as reported by the engine, in pawns.
///
/// The sign is the engine's own: it is passed through untouched.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct StaticEval(pub f64);

impl StaticEval {
    pub fn new(pawns: f64) -> StaticEval {
        StaticEval(pawns)
    }

    pub fn pawns(&self) -> f64 {
        self.0
    }
}

impl Display for StaticEval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::StaticEval;

    #[test]
    fn always_shows_sign_and_two_decimals() {
        assert_eq!(StaticEval::new(0.25).to_string(), "+0.25");
        assert_eq!(StaticEval::new(-1.5).to_string(), "-1.50");
        assert_eq!(StaticEval::new(0.0).to_string(), "+0.00");
        assert_eq!(StaticEval::new(3.14159).to_string(), "+3.14");
        assert_eq!(StaticEval::new(-12.0).to_string(), "-12.00");
    }
}
