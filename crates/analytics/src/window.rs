use std::collections::VecDeque;

/// A fixed-capacity, trailing window over a nullable series.
///
/// Pushing past capacity evicts the oldest value in O(1). The number of nulls
/// currently inside the window is tracked so callers can tell in O(1) whether
/// the window is complete.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    values: VecDeque<Option<T>>,
    capacity: usize,
    nulls: usize,
}

impl<T> SlidingWindow<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sliding window capacity must be positive");
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            nulls: 0,
        }
    }

    /// Appends a value, returning the evicted one once the window is full.
    pub fn push(&mut self, value: Option<T>) -> Option<Option<T>> {
        if value.is_none() {
            self.nulls += 1;
        }
        self.values.push_back(value);

        if self.values.len() > self.capacity {
            let evicted = self.values.pop_front()?;
            if evicted.is_none() {
                self.nulls -= 1;
            }
            return Some(evicted);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn null_count(&self) -> usize {
        self.nulls
    }

    /// True when the window is full and holds no nulls.
    pub fn is_complete(&self) -> bool {
        self.is_full() && self.nulls == 0
    }

    /// Iterates the non-null values, oldest first.
    pub fn present(&self) -> impl Iterator<Item = &T> {
        self.values.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.nulls = 0;
    }
}
