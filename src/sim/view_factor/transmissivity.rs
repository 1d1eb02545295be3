//! Occluder transmissivity: a constant or an hourly series.
//!
//! 0 is opaque, 1 is fully transparent. Hourly series index hours from the
//! start of the run and must all have the same length.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transmissivity {
    Constant(f64),
    Hourly(Vec<f64>),
}

impl Transmissivity {
    pub fn opaque() -> Self {
        Self::Constant(0.)
    }

    pub fn transparent() -> Self {
        Self::Constant(1.)
    }

    /// Number of hourly values, `None` for a constant.
    pub fn hours(&self) -> Option<usize> {
        match self {
            Self::Constant(_) => None,
            Self::Hourly(values) => Some(values.len()),
        }
    }

    /// Value at `hour`. Constants repeat, series wrap around like a schedule.
    pub fn value_at(&self, hour: usize) -> f64 {
        match self {
            Self::Constant(t) => *t,
            Self::Hourly(values) if values.is_empty() => 0.,
            Self::Hourly(values) => values[hour % values.len()],
        }
    }

    /// True if nothing passes at any hour.
    pub fn is_opaque(&self) -> bool {
        match self {
            Self::Constant(t) => *t <= 0.,
            Self::Hourly(values) => values.iter().all(|t| *t <= 0.),
        }
    }

    /// Checks that every value is a finite fraction in [0, 1].
    pub fn validate(&self) -> Result<(), String> {
        let bad = |t: f64| !(t.is_finite() && (0. ..=1.).contains(&t));
        match self {
            Self::Constant(t) if bad(*t) => Err(format!("transmissivity {t} is outside [0, 1]")),
            Self::Hourly(values) if values.is_empty() => {
                Err("hourly transmissivity has no values".to_string())
            }
            Self::Hourly(values) => match values.iter().position(|t| bad(*t)) {
                Some(h) => Err(format!(
                    "hourly transmissivity {} at hour {h} is outside [0, 1]",
                    values[h]
                )),
                None => Ok(()),
            },
            Self::Constant(_) => Ok(()),
        }
    }
}

impl Default for Transmissivity {
    fn default() -> Self {
        Self::opaque()
    }
}

/// Transmissivity of two occluders in series.
impl Mul for &Transmissivity {
    type Output = Transmissivity;

    fn mul(self, other: &Transmissivity) -> Transmissivity {
        use Transmissivity::{Constant, Hourly};
        match (self, other) {
            (Constant(a), Constant(b)) => Constant(a * b),
            (Constant(a), Hourly(v)) | (Hourly(v), Constant(a)) => {
                Hourly(v.iter().map(|t| t * a).collect())
            }
            (Hourly(a), Hourly(b)) => Hourly(a.iter().zip(b).map(|(x, y)| x * y).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products() {
        let half = Transmissivity::Constant(0.5);
        let series = Transmissivity::Hourly(vec![1.0, 0.5, 0.0]);

        assert_eq!(&half * &half, Transmissivity::Constant(0.25));
        assert_eq!(&half * &series, Transmissivity::Hourly(vec![0.5, 0.25, 0.0]));
        assert_eq!(&series * &half, Transmissivity::Hourly(vec![0.5, 0.25, 0.0]));
        assert_eq!(&series * &series, Transmissivity::Hourly(vec![1.0, 0.25, 0.0]));
    }

    #[test]
    fn test_value_at() {
        let series = Transmissivity::Hourly(vec![0.1, 0.2]);
        assert_eq!(series.value_at(0), 0.1);
        assert_eq!(series.value_at(3), 0.2);
        assert_eq!(Transmissivity::Constant(0.7).value_at(100), 0.7);
        assert_eq!(series.hours(), Some(2));
        assert_eq!(Transmissivity::opaque().hours(), None);
    }

    #[test]
    fn test_opaque() {
        assert!(Transmissivity::opaque().is_opaque());
        assert!(Transmissivity::Hourly(vec![0., 0.]).is_opaque());
        assert!(!Transmissivity::Hourly(vec![0., 0.1]).is_opaque());
        assert!(!Transmissivity::transparent().is_opaque());
    }

    #[test]
    fn test_validate() {
        assert!(Transmissivity::Constant(0.3).validate().is_ok());
        assert!(Transmissivity::Constant(1.3).validate().is_err());
        assert!(Transmissivity::Constant(f64::NAN).validate().is_err());
        assert!(Transmissivity::Hourly(vec![]).validate().is_err());
        assert!(Transmissivity::Hourly(vec![0.2, -0.1]).validate().is_err());
    }

    #[test]
    fn test_json_forms() {
        let c: Transmissivity = serde_json::from_str("0.4").unwrap();
        assert_eq!(c, Transmissivity::Constant(0.4));
        let h: Transmissivity = serde_json::from_str("[0.4, 1.0]").unwrap();
        assert_eq!(h, Transmissivity::Hourly(vec![0.4, 1.0]));
    }
}
