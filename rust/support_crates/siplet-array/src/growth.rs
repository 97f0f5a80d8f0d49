//! Capacity growth policy.

use siplet_common::{Result, error::Error};

/// Smallest capacity handed out once an array starts growing.
pub const MIN_AUTO_CAPACITY: usize = 4;

/// Computes the capacity to allocate so that at least `min_growth` more elements fit
/// after the current `len`.
///
/// The array grows by half of its length (1.5x), but never by more than the headroom
/// left below `max_size` and never by less than `min_growth`. The result is at least
/// [`MIN_AUTO_CAPACITY`] unless `max_size` itself is smaller.
///
/// Guarantees `result - len >= min_growth` and `result <= max_size` on success.
///
/// # Errors
///
/// Capacity-exceeded if `len + min_growth > max_size` (reported as an overflow when the
/// sum is not even representable).
pub fn auto_capacity(len: usize, max_size: usize, min_growth: usize) -> Result<usize> {
    let headroom = max_size.saturating_sub(len);
    if min_growth > headroom {
        return Err(match len.checked_add(min_growth) {
            Some(requested) => Error::capacity_exceeded(requested, max_size),
            None => Error::capacity_overflow(len, min_growth),
        });
    }
    // `growth <= headroom`, so `len + growth <= max_size` cannot overflow.
    let growth = (len / 2).min(headroom).max(min_growth);
    Ok((len + growth).max(MIN_AUTO_CAPACITY).min(max_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_capacity_small() {
        assert_eq!(auto_capacity(0, 100, 1).unwrap(), 4);
        assert_eq!(auto_capacity(4, 100, 1).unwrap(), 6);
        assert_eq!(auto_capacity(10, 100, 1).unwrap(), 15);
        assert_eq!(auto_capacity(10, 100, 20).unwrap(), 30);
        assert_eq!(auto_capacity(0, 2, 1).unwrap(), 2);
    }

    #[test]
    fn test_auto_capacity_near_max() {
        assert_eq!(auto_capacity(90, 100, 1).unwrap(), 100);
        assert_eq!(auto_capacity(99, 100, 1).unwrap(), 100);
        assert_eq!(auto_capacity(usize::MAX - 10, usize::MAX, 3).unwrap(), usize::MAX);
    }

    #[test]
    fn test_auto_capacity_exceeded() {
        let err = auto_capacity(100, 100, 1).unwrap_err();
        assert!(err.is_capacity_exceeded());
        let err = auto_capacity(usize::MAX - 1, 10, usize::MAX).unwrap_err();
        assert!(err.is_capacity_exceeded());
        assert!(matches!(
            err.kind(),
            siplet_common::error::ErrorKind::CapacityOverflow { .. }
        ));
    }

    #[test]
    fn test_auto_capacity_properties() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..10_000 {
            let max_size = match rng.u8(0..4) {
                0 => rng.usize(1..64),
                1 => rng.usize(1..),
                2 => usize::MAX,
                _ => rng.usize(1..1_000_000),
            };
            let len = rng.usize(..max_size);
            let min_growth = rng.usize(1..=max_size - len);
            let capacity = auto_capacity(len, max_size, min_growth).unwrap();
            assert!(capacity - len >= min_growth);
            assert!(capacity <= max_size);
        }
    }
}
