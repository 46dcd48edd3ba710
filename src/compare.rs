//! Strict weak orderings used to sort each side of a bimap.

use std::cmp::Ordering;

/// A strict weak ordering over `T`.
///
/// Two values are equivalent when neither is less than the other. Any closure of type
/// `Fn(&T, &T) -> Ordering` is a comparator.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use treap_bimap::compare::{Compare, Natural};
///
/// assert!(Natural.less(&1, &2));
///
/// let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
/// assert_eq!(by_len.compare(&"ab", &"cd"), Ordering::Equal);
/// assert!(by_len.equivalent(&"ab", &"cd"));
/// ```
pub trait Compare<T: ?Sized> {
    /// Compares two values.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Returns `true` if `a` is ordered strictly before `b`.
    fn less(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Returns `true` if neither value is ordered before the other.
    fn equivalent(&self, a: &T, b: &T) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// The ordering given by `Ord`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Natural;

impl<T: Ord + ?Sized> Compare<T> for Natural {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}
