//! Element probes that count their own lifecycle.
//!
//! A [`Probe`] is a shared counter block. Every [`Counted`] value made
//! through it bumps `constructed`, and every drop bumps `dropped`, so a
//! test can assert that a rollback destroyed exactly what it built. The
//! probe can be armed to fail the N+1th construction: [`Probe::make`] then
//! returns [`ConstructionFailed`], and `Counted::clone` panics.

use std::cell::Cell;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Counters {
    constructed: Cell<usize>,
    dropped: Cell<usize>,
    /// Constructions still allowed before failing, if armed.
    allowance: Cell<Option<usize>>,
    attempts: Cell<usize>,
}

/// Shared construction/drop counters for [`Counted`] values.
#[derive(Clone, Debug, Default)]
pub struct Probe {
    counters: Rc<Counters>,
}

impl Probe {
    /// A probe with zeroed counters that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `n` more constructions succeed, then fail every one after.
    pub fn fail_after(&self, n: usize) {
        self.counters.allowance.set(Some(n));
    }

    /// Stop failing constructions.
    pub fn disarm(&self) {
        self.counters.allowance.set(None);
    }

    /// Construct a tracked value, or fail if the probe is armed and spent.
    pub fn make(&self, value: u32) -> Result<Counted, ConstructionFailed> {
        let counters = &self.counters;
        counters.attempts.set(counters.attempts.get() + 1);
        if let Some(left) = counters.allowance.get() {
            if left == 0 {
                return Err(ConstructionFailed {
                    attempt: counters.attempts.get(),
                });
            }
            counters.allowance.set(Some(left - 1));
        }
        counters.constructed.set(counters.constructed.get() + 1);
        Ok(Counted {
            value,
            probe: self.clone(),
        })
    }

    /// Successful constructions so far.
    pub fn constructed(&self) -> usize {
        self.counters.constructed.get()
    }

    /// Values dropped so far.
    pub fn dropped(&self) -> usize {
        self.counters.dropped.get()
    }

    /// Values constructed and not yet dropped.
    pub fn live(&self) -> usize {
        self.constructed() - self.dropped()
    }
}

/// A value whose construction and destruction are reported to a [`Probe`].
///
/// Equality and ordering look at the payload only.
pub struct Counted {
    value: u32,
    probe: Probe,
}

impl Counted {
    /// The payload.
    pub fn value(&self) -> u32 {
        self.value
    }
}

impl Clone for Counted {
    /// Counts as a construction; panics if the probe refuses it.
    fn clone(&self) -> Self {
        match self.probe.make(self.value) {
            Ok(copy) => copy,
            Err(err) => panic!("{err}"),
        }
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        let dropped = &self.probe.counters.dropped;
        dropped.set(dropped.get() + 1);
    }
}

impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Counted {}

impl fmt::Debug for Counted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Counted({})", self.value)
    }
}

/// A [`Probe`] refused to construct a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstructionFailed {
    /// 1-based index of the refused construction attempt.
    pub attempt: usize,
}

impl fmt::Display for ConstructionFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "construction attempt {} refused", self.attempt)
    }
}

impl Error for ConstructionFailed {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_constructions_and_drops() {
        let probe = Probe::new();
        let a = probe.make(1).unwrap();
        let b = a.clone();
        assert_eq!(probe.constructed(), 2);
        drop(a);
        assert_eq!(probe.dropped(), 1);
        assert_eq!(probe.live(), 1);
        assert_eq!(b.value(), 1);
    }

    #[test]
    fn armed_probe_fails_after_allowance() {
        let probe = Probe::new();
        probe.fail_after(2);
        let _a = probe.make(1).unwrap();
        let _b = probe.make(2).unwrap();
        assert_eq!(probe.make(3), Err(ConstructionFailed { attempt: 3 }));
        assert_eq!(probe.constructed(), 2);
        probe.disarm();
        assert!(probe.make(4).is_ok());
    }

    #[test]
    #[should_panic(expected = "construction attempt 2 refused")]
    fn clone_panics_when_refused() {
        let probe = Probe::new();
        let a = probe.make(1).unwrap();
        probe.fail_after(0);
        let _ = a.clone();
    }
}
