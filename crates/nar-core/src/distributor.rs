use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

/// Pseudo-uniform level-selection sequence for priority bags.
///
/// For a range R the sequence has length R·(R+1)/2 and value `k` appears
/// exactly k+1 times, spread across the sequence so that high levels are
/// visited proportionally more often while low levels still come up
/// periodically. One instance per range is cached process-wide.
#[derive(Debug)]
pub struct Distributor {
    order: Vec<usize>,
}

static CACHE: LazyLock<Mutex<HashMap<usize, Arc<Distributor>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

impl Distributor {
    /// Get (or build and cache) the distributor for the given range.
    pub fn for_range(range: usize) -> Arc<Distributor> {
        let mut cache = CACHE.lock().expect("distributor cache poisoned");
        cache
            .entry(range)
            .or_insert_with(|| Arc::new(Self::build(range)))
            .clone()
    }

    fn build(range: usize) -> Self {
        let capacity = range * (range + 1) / 2;
        let mut order = vec![usize::MAX; capacity];
        let mut index = capacity;

        for rank in (1..=range).rev() {
            let step = capacity / rank;
            for _ in 0..rank {
                index = (index + step) % capacity;
                while order[index] != usize::MAX {
                    index = (index + 1) % capacity;
                }
                order[index] = rank - 1;
            }
        }

        Self { order }
    }

    /// Level value at a sequence position.
    pub fn pick(&self, index: usize) -> usize {
        self.order[index]
    }

    /// Next sequence position, wrapping at the end.
    pub fn next(&self, index: usize) -> usize {
        (index + 1) % self.order.len()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        let d = Distributor::build(100);
        assert_eq!(d.len(), 100 * 101 / 2);
    }

    #[test]
    fn test_value_k_appears_k_plus_one_times() {
        let d = Distributor::build(10);
        let mut counts = vec![0usize; 10];
        for i in 0..d.len() {
            counts[d.pick(i)] += 1;
        }
        for (k, count) in counts.iter().enumerate() {
            assert_eq!(*count, k + 1, "value {k} should appear {} times", k + 1);
        }
    }

    #[test]
    fn test_all_slots_filled() {
        let d = Distributor::build(100);
        for i in 0..d.len() {
            assert!(d.pick(i) < 100, "slot {i} holds out-of-range value");
        }
    }

    #[test]
    fn test_next_wraps() {
        let d = Distributor::build(4);
        assert_eq!(d.next(d.len() - 1), 0);
        assert_eq!(d.next(0), 1);
    }

    #[test]
    fn test_cache_shares_instances() {
        let a = Distributor::for_range(100);
        let b = Distributor::for_range(100);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_high_values_spread_out() {
        // The top value should not be bunched: successive occurrences of
        // range-1 should be separated by at least one other value.
        let d = Distributor::build(10);
        let mut last_top: Option<usize> = None;
        for i in 0..d.len() {
            if d.pick(i) == 9 {
                if let Some(prev) = last_top {
                    assert!(i - prev >= 2, "top level bunched at {prev} and {i}");
                }
                last_top = Some(i);
            }
        }
    }
}
