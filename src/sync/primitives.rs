//! Synchronization primitives for ISR-safe access.
//!
//! The building block under the shared driver wrappers.

use core::cell::RefCell;
use critical_section::Mutex;

/// Interior mutability guarded by a critical section.
///
/// `critical_section::Mutex` keeps interrupts out for the duration of
/// an access while `RefCell` hands out the mutable borrow, so one
/// instance serves thread context and interrupt handlers alike.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Const constructor, so cells can live in `static`s.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` over the contents with interrupts masked throughout.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Like [`Self::with`], but backs off with `None` when the contents
    /// are already borrowed further up the call stack.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut guard = self.inner.borrow(cs).try_borrow_mut().ok()?;
            Some(f(&mut guard))
        })
    }
}

// SAFETY: every path to the contents runs inside a critical section.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}

#[cfg(test)]
#[allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn contents_survive_between_accesses() {
        let cell = CriticalSectionCell::new(7u32);
        cell.with(|v| *v += 35);
        assert_eq!(cell.with(|v| *v), 42);
    }

    #[test]
    fn closure_results_pass_through() {
        let cell = CriticalSectionCell::new(21u32);
        assert_eq!(cell.with(|v| *v * 2), 42);
        assert_eq!(cell.try_with(|v| *v), Some(21));
    }

    #[test]
    fn try_with_backs_off_while_borrowed() {
        let cell = CriticalSectionCell::new(1u32);

        // simulates an ISR poking the cell mid-access
        let nested = cell.with(|_| cell.try_with(|v| *v));
        assert_eq!(nested, None);

        // and recovers once the outer borrow ends
        assert_eq!(cell.try_with(|v| *v), Some(1));
    }

    #[test]
    fn usable_as_a_static() {
        static SHARED: CriticalSectionCell<u32> = CriticalSectionCell::new(0);
        SHARED.with(|v| *v = 100);
        assert_eq!(SHARED.with(|v| *v), 100);
    }
}
