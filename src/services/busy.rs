//! In-flight guard for operator-triggered operations.

use crate::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a busy flag for as long as it lives.
///
/// Acquiring an already-set flag fails with [`AppError::Busy`], so a second
/// submission is rejected instead of racing the first.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    pub fn acquire(flag: &'a AtomicBool, operation: &str) -> Result<Self, AppError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::busy(operation))?;
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let flag = AtomicBool::new(false);

        let guard = BusyGuard::acquire(&flag, "Batch push").unwrap();
        let err = BusyGuard::acquire(&flag, "Batch push").unwrap_err();
        assert_eq!(err.to_string(), "Batch push is already in progress");

        drop(guard);
        assert!(BusyGuard::acquire(&flag, "Batch push").is_ok());
    }
}
