//! # Desired pool size.
//!
//! [`TargetCount`] holds the non-negative number of workers the pool should run,
//! bounded by a ceiling. Only the reconciler mutates it, with values read from a
//! [`TargetSource`](crate::TargetSource).

use crate::error::SourceError;

/// Non-negative desired worker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetCount {
    value: usize,
    max: usize,
}

impl TargetCount {
    /// Creates an unbounded target with the given value.
    pub fn new(value: usize) -> Self {
        Self::with_max(value, usize::MAX)
    }

    /// Creates a target that rejects updates above `max`.
    ///
    /// An initial `value` above `max` is lowered to `max`.
    pub fn with_max(value: usize, max: usize) -> Self {
        Self {
            value: value.min(max),
            max,
        }
    }

    /// Returns the ceiling.
    #[inline]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Returns the current value.
    #[inline]
    pub fn get(&self) -> usize {
        self.value
    }

    /// Applies a raw value read from a source.
    ///
    /// Returns:
    /// - `Ok(Some(previous))` when the value changed,
    /// - `Ok(None)` when it is equal to the current one,
    /// - `Err(InvalidValue)` for negative input,
    /// - `Err(TooLarge)` for input above the ceiling.
    ///
    /// On error the current value is kept.
    pub fn update(&mut self, raw: i64) -> Result<Option<usize>, SourceError> {
        let value = usize::try_from(raw).map_err(|_| SourceError::InvalidValue { value: raw })?;
        if value > self.max {
            return Err(SourceError::TooLarge {
                value: raw,
                max: self.max,
            });
        }
        if value == self.value {
            return Ok(None);
        }
        let previous = std::mem::replace(&mut self.value, value);
        Ok(Some(previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_reports_previous() {
        let mut t = TargetCount::new(1);
        assert_eq!(t.update(3), Ok(Some(1)));
        assert_eq!(t.get(), 3);
        assert_eq!(t.update(3), Ok(None));
        assert_eq!(t.update(0), Ok(Some(3)));
        assert_eq!(t.get(), 0);
    }

    #[test]
    fn test_negative_keeps_prior_value() {
        let mut t = TargetCount::new(2);
        assert_eq!(t.update(-1), Err(SourceError::InvalidValue { value: -1 }));
        assert_eq!(t.get(), 2);
    }

    #[test]
    fn test_above_max_keeps_prior_value() {
        let mut t = TargetCount::with_max(2, 10);
        assert_eq!(t.update(10), Ok(Some(2)));
        assert_eq!(
            t.update(11),
            Err(SourceError::TooLarge { value: 11, max: 10 })
        );
        assert_eq!(
            t.update(i64::MAX),
            Err(SourceError::TooLarge {
                value: i64::MAX,
                max: 10
            })
        );
        assert_eq!(t.get(), 10);
    }

    #[test]
    fn test_initial_value_is_capped() {
        let t = TargetCount::with_max(50, 8);
        assert_eq!(t.get(), 8);
        assert_eq!(t.max(), 8);
    }
}
