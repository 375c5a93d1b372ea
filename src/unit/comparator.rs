//! Comparison strategies
//!
//! A comparator decides whether the value a unit produced is acceptable
//! relative to the value it expected. Strategies are pure and hold no state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicate over an actual and an expected value
pub trait Comparator<T: ?Sized>: Send {
    /// Returns true if `actual` is an acceptable outcome given `expected`.
    fn compare(&self, actual: &T, expected: &T) -> bool;
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> bool + Send,
{
    fn compare(&self, actual: &T, expected: &T) -> bool {
        self(actual, expected)
    }
}

/// `actual == expected`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsEqual;

/// `actual != expected`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsDifferent;

/// `actual > expected`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsGreater;

/// `actual >= expected`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsGreaterOrEqual;

/// `actual < expected`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsLesser;

/// `actual <= expected`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsLesserOrEqual;

impl<T: PartialEq + ?Sized> Comparator<T> for IsEqual {
    fn compare(&self, actual: &T, expected: &T) -> bool {
        actual == expected
    }
}

impl<T: PartialEq + ?Sized> Comparator<T> for IsDifferent {
    fn compare(&self, actual: &T, expected: &T) -> bool {
        actual != expected
    }
}

impl<T: PartialOrd + ?Sized> Comparator<T> for IsGreater {
    fn compare(&self, actual: &T, expected: &T) -> bool {
        actual > expected
    }
}

impl<T: PartialOrd + ?Sized> Comparator<T> for IsGreaterOrEqual {
    fn compare(&self, actual: &T, expected: &T) -> bool {
        actual >= expected
    }
}

impl<T: PartialOrd + ?Sized> Comparator<T> for IsLesser {
    fn compare(&self, actual: &T, expected: &T) -> bool {
        actual < expected
    }
}

impl<T: PartialOrd + ?Sized> Comparator<T> for IsLesserOrEqual {
    fn compare(&self, actual: &T, expected: &T) -> bool {
        actual <= expected
    }
}

/// Strategy chosen at construction time rather than by type
///
/// Useful when the comparison comes from data (a table of cases, a config
/// file). Every variant needs `PartialOrd`; use the unit structs above for
/// types that only implement `PartialEq`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl<T: PartialOrd + ?Sized> Comparator<T> for Comparison {
    fn compare(&self, actual: &T, expected: &T) -> bool {
        match self {
            Comparison::Equal => IsEqual.compare(actual, expected),
            Comparison::NotEqual => IsDifferent.compare(actual, expected),
            Comparison::Greater => IsGreater.compare(actual, expected),
            Comparison::GreaterOrEqual => IsGreaterOrEqual.compare(actual, expected),
            Comparison::Less => IsLesser.compare(actual, expected),
            Comparison::LessOrEqual => IsLesserOrEqual.compare(actual, expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_strategies() {
        assert!(IsEqual.compare(&3, &3));
        assert!(!IsEqual.compare(&3, &4));
        assert!(IsDifferent.compare(&"a", &"b"));
        assert!(!IsDifferent.compare(&"a", &"a"));
    }

    #[test]
    fn test_ordering_strategies_compare_actual_to_expected() {
        assert!(IsGreater.compare(&5, &4));
        assert!(!IsGreater.compare(&4, &4));
        assert!(IsGreaterOrEqual.compare(&4, &4));
        assert!(IsLesser.compare(&1.5, &2.0));
        assert!(!IsLesser.compare(&2.0, &2.0));
        assert!(IsLesserOrEqual.compare(&2.0, &2.0));
    }

    #[test]
    fn test_comparison_matches_unit_strategies() {
        let pairs = [(1, 2), (2, 2), (3, 2)];
        for (actual, expected) in pairs {
            assert_eq!(
                Comparison::Equal.compare(&actual, &expected),
                IsEqual.compare(&actual, &expected)
            );
            assert_eq!(
                Comparison::NotEqual.compare(&actual, &expected),
                IsDifferent.compare(&actual, &expected)
            );
            assert_eq!(
                Comparison::Greater.compare(&actual, &expected),
                IsGreater.compare(&actual, &expected)
            );
            assert_eq!(
                Comparison::GreaterOrEqual.compare(&actual, &expected),
                IsGreaterOrEqual.compare(&actual, &expected)
            );
            assert_eq!(
                Comparison::Less.compare(&actual, &expected),
                IsLesser.compare(&actual, &expected)
            );
            assert_eq!(
                Comparison::LessOrEqual.compare(&actual, &expected),
                IsLesserOrEqual.compare(&actual, &expected)
            );
        }
    }

    #[test]
    fn test_closure_comparator() {
        let close_enough = |a: &f64, b: &f64| (a - b).abs() < 0.01;
        assert!(close_enough.compare(&1.001, &1.0));
        assert!(!close_enough.compare(&1.1, &1.0));
    }

    #[test]
    fn test_comparison_default_and_symbol() {
        assert_eq!(Comparison::default(), Comparison::Equal);
        assert_eq!(Comparison::LessOrEqual.to_string(), "<=");
    }
}
