//! Bounded ring buffer holding streamed sample packages

use std::collections::VecDeque;

/// Ring buffer of sample packages (one `Vec<f64>` column each).
///
/// The producer never blocks: pushing into a full buffer discards the oldest
/// package and counts the loss.
#[derive(Debug)]
pub struct SampleBuffer {
    packages: VecDeque<Vec<f64>>,
    capacity: usize,
    discarded: u64,
}

impl SampleBuffer {
    /// New buffer holding at most `capacity` packages
    pub fn new(capacity: usize) -> Self {
        SampleBuffer {
            packages: VecDeque::new(),
            capacity: capacity.max(1),
            discarded: 0,
        }
    }

    /// Append one package, discarding the oldest when full
    pub fn push(&mut self, package: Vec<f64>) {
        if self.packages.len() == self.capacity {
            self.packages.pop_front();
            self.discarded += 1;
        }
        self.packages.push_back(package);
    }

    /// Append a batch of packages in order
    pub fn extend(&mut self, packages: Vec<Vec<f64>>) {
        for package in packages {
            self.push(package);
        }
    }

    /// Remove and return everything, oldest first
    pub fn drain_all(&mut self) -> Vec<Vec<f64>> {
        self.packages.drain(..).collect()
    }

    /// Clone the newest `count` packages (oldest of those first) without
    /// removing anything
    pub fn peek_latest(&self, count: usize) -> Vec<Vec<f64>> {
        let available = self.packages.len();
        let take = count.min(available);
        self.packages
            .iter()
            .skip(available - take)
            .cloned()
            .collect()
    }

    /// Number of buffered packages
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// True when nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Maximum number of packages the buffer will hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Packages lost to overflow since creation
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(v: f64) -> Vec<f64> {
        vec![v, v + 0.5]
    }

    #[test]
    fn test_push_and_drain_order() {
        let mut buffer = SampleBuffer::new(10);
        buffer.push(package(1.0));
        buffer.push(package(2.0));
        buffer.push(package(3.0));

        assert_eq!(buffer.len(), 3);
        let drained = buffer.drain_all();
        assert_eq!(drained[0], package(1.0));
        assert_eq!(drained[2], package(3.0));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_overflow_discards_oldest() {
        let mut buffer = SampleBuffer::new(3);
        for i in 0..5 {
            buffer.push(package(i as f64));
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.discarded(), 2);
        let drained = buffer.drain_all();
        assert_eq!(drained[0], package(2.0));
        assert_eq!(drained[2], package(4.0));
    }

    #[test]
    fn test_peek_latest_keeps_contents() {
        let mut buffer = SampleBuffer::new(10);
        buffer.extend((0..6).map(|i| package(i as f64)).collect());

        let latest = buffer.peek_latest(2);
        assert_eq!(latest, vec![package(4.0), package(5.0)]);
        assert_eq!(buffer.len(), 6);

        // Asking for more than is buffered returns everything
        assert_eq!(buffer.peek_latest(100).len(), 6);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let buffer = SampleBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
    }
}
