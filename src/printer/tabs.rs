//! Bounded, strictly increasing tab-stop lists.

use arrayvec::ArrayVec;

/// Tab stops in inches, at most `N` of them, strictly increasing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabStops<const N: usize> {
    stops: ArrayVec<f64, N>,
}

impl<const N: usize> TabStops<N> {
    pub fn new() -> Self {
        Self {
            stops: ArrayVec::new(),
        }
    }

    /// Stops at `0, step, 2*step, ...` filling the whole capacity.
    pub fn every(step: f64) -> Self {
        let mut tabs = Self::new();
        for i in 0..N {
            tabs.stops.push(i as f64 * step);
        }
        tabs
    }

    /// Append a stop.
    ///
    /// Returns `false` when the stop does not lie beyond the last one, which
    /// terminates a tab list. Stops past capacity are dropped silently.
    pub fn push(&mut self, stop: f64) -> bool {
        if let Some(&last) = self.stops.last() {
            if stop <= last {
                return false;
            }
        }
        let _ = self.stops.try_push(stop);
        true
    }

    /// First stop strictly greater than `pos`.
    pub fn next_after(&self, pos: f64) -> Option<f64> {
        self.stops.iter().copied().find(|&stop| stop > pos)
    }

    pub fn clear(&mut self) {
        self.stops.clear();
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.stops.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_after() {
        let mut tabs = TabStops::<4>::new();
        tabs.push(1.0);
        tabs.push(2.0);
        assert_eq!(tabs.next_after(1.5), Some(2.0));
        assert_eq!(tabs.next_after(1.0), Some(2.0));
        assert_eq!(tabs.next_after(2.5), None);
    }

    #[test]
    fn test_non_increasing_terminates() {
        let mut tabs = TabStops::<4>::new();
        assert!(tabs.push(1.0));
        assert!(!tabs.push(1.0));
        assert!(!tabs.push(0.5));
        assert_eq!(tabs.len(), 1);
    }

    #[test]
    fn test_saturates_at_capacity() {
        let mut tabs = TabStops::<2>::new();
        assert!(tabs.push(1.0));
        assert!(tabs.push(2.0));
        assert!(tabs.push(3.0));
        assert_eq!(tabs.iter().collect::<Vec<_>>(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_every() {
        let tabs = TabStops::<32>::every(0.8);
        assert_eq!(tabs.len(), 32);
        assert_eq!(tabs.next_after(0.0), Some(0.8));
        assert!((tabs.iter().last().unwrap() - 24.8).abs() < 1e-9);
    }
}
