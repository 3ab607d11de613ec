//! A fixed-capacity circular buffer with overwrite-on-full.
//!
//! A [`RingBuffer`] stores items in insertion order while keeping its length
//! bounded by the caller-provided capacity. When [`push`](RingBuffer::push)
//! receives a new value and the buffer is full, the oldest element is
//! discarded and handed back to the caller.
//!
//! # Complexity
//! - `push`, `len`, `is_full`, `capacity` and `clear` are **O(1)**.
//! - `newest_first` walks the buffer once.

use std::collections::VecDeque;

/// A fixed-capacity circular buffer storing elements in first-in-first-out
/// order.
///
/// # Examples
///
/// ```rust
/// use vitaltrace_core::collections::RingBuffer;
///
/// let mut buffer = RingBuffer::new(3);
/// buffer.push(1);
/// buffer.push(2);
/// buffer.push(3);
/// assert_eq!(buffer.push(4), Some(1)); // evicts the oldest item
///
/// assert_eq!(buffer.newest_first().copied().collect::<Vec<_>>(), vec![4, 3, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingBuffer<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates a new buffer with the provided capacity.
    ///
    /// A capacity of zero is clamped to `1`.
    #[inline]
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { buf: VecDeque::with_capacity(capacity), capacity }
    }

    /// Pushes an item, returning the evicted oldest item when full.
    #[inline]
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() { self.buf.pop_front() } else { None };
        self.buf.push_back(item);
        evicted
    }

    /// Returns the number of items currently stored.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` when the buffer has no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns `true` when the buffer reached its capacity.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Returns the maximum number of items the buffer can hold.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all elements, leaving the capacity unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Iterates from the most recently pushed element to the oldest.
    #[inline]
    pub fn newest_first(&self) -> impl Iterator<Item = &T> {
        self.buf.iter().rev()
    }

    /// Iterates from the oldest element to the most recently pushed.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new(1)
    }
}
