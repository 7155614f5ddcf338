use crate::TdError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, TdError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TdError::NonFinite { what, value: v })
    }
}

/// Accept `v` only if it is finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, TdError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(TdError::InvalidArg { what, value: v })
    }
}

/// Direction of a signed quantity.
///
/// NaN classifies as `Zero` so it never counts as a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    pub fn of(v: Real) -> Self {
        if v > 0.0 {
            Sign::Positive
        } else if v < 0.0 {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }

    pub fn is_zero(self) -> bool {
        self == Sign::Zero
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(matches!(
            ensure_positive(0.0, "volume"),
            Err(TdError::InvalidArg { .. })
        ));
        assert!(matches!(
            ensure_positive(-3.0, "volume"),
            Err(TdError::InvalidArg { .. })
        ));
        assert!(matches!(
            ensure_positive(Real::INFINITY, "volume"),
            Err(TdError::NonFinite { .. })
        ));
        assert_eq!(ensure_positive(0.01, "volume").unwrap(), 0.01);
    }

    #[test]
    fn sign_classification() {
        assert_eq!(Sign::of(2.5), Sign::Positive);
        assert_eq!(Sign::of(-1e-300), Sign::Negative);
        assert_eq!(Sign::of(0.0), Sign::Zero);
        assert_eq!(Sign::of(-0.0), Sign::Zero);
        assert!(Sign::of(Real::NAN).is_zero());
    }
}
