use std::sync::atomic::{AtomicU64, Ordering};

/// Sequencer - process-wide event numbering
///
/// Starts at zero when the bus is built; the first event gets 1.
/// Numbering restarts with the process and is not persisted.
#[derive(Debug, Default)]
pub struct Sequencer {
    counter: AtomicU64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number. Never repeats within the process.
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Last issued sequence number (0 when nothing was published yet)
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_at_one_and_increments() {
        let seq = Sequencer::new();
        assert_eq!(seq.current(), 0);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
        assert_eq!(seq.current(), 2);
    }

    #[test]
    fn test_concurrent_callers_get_unique_numbers() {
        let seq = Arc::new(Sequencer::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seq = seq.clone();
                thread::spawn(move || (0..1000).map(|_| seq.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let numbers = handle.join().unwrap();
            // Each caller observes its own numbers strictly increasing
            assert!(numbers.windows(2).all(|w| w[0] < w[1]));
            for n in numbers {
                assert!(seen.insert(n), "duplicate sequence {}", n);
            }
        }

        assert_eq!(seen.len(), 8000);
        assert_eq!(seq.current(), 8000);
    }
}
