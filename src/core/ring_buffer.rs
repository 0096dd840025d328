//! Growable circular queue used to stage formatted entries
//!
//! The buffer has no synchronization of its own; owners wrap it in a lock.
//! It grows by doubling when full, up to a hard ceiling, and never shrinks.

use super::error::{LoggerError, Result};
use std::mem;

/// Capacity allocated on the first growth of a zero-capacity buffer
pub const DEFAULT_CAPACITY: usize = 8;

/// Hard ceiling on the number of slots
pub const MAX_CAPACITY: usize = 0x7FEF_FFFF;

/// FIFO queue over a circular slot array
///
/// Invariants: `count <= slots.len()`, `head` and `tail` are always inside
/// `0..slots.len()` (both zero when there are no slots), and the live items
/// are the `count` slots starting at `head`, wrapping.
///
/// # Example
///
/// ```
/// use rust_logger_pipeline::core::RingBuffer;
///
/// let mut queue = RingBuffer::new();
/// queue.enqueue("first").unwrap();
/// queue.enqueue("second").unwrap();
///
/// assert_eq!(queue.dequeue().unwrap(), "first");
/// assert_eq!(queue.len(), 1);
/// ```
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    count: usize,
    max_capacity: usize,
}

impl<T> RingBuffer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_max_capacity(capacity, MAX_CAPACITY)
    }

    /// Create a buffer that refuses to grow past `max_capacity` slots
    ///
    /// The initial capacity is clamped to `max_capacity`.
    #[must_use]
    pub fn with_max_capacity(capacity: usize, max_capacity: usize) -> Self {
        let capacity = capacity.min(max_capacity);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            tail: 0,
            count: 0,
            max_capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Append an item at the tail, growing the storage when it is full
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::CapacityExceeded`] when growth would exceed the
    /// maximum capacity. The buffer is left unchanged in that case.
    pub fn enqueue(&mut self, item: T) -> Result<()> {
        self.ensure_capacity(self.count + 1)?;

        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        self.count += 1;
        Ok(())
    }

    /// Remove and return the oldest item
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::BufferEmpty`] when there is nothing to dequeue.
    /// Callers are expected to check [`len`](Self::len) first.
    pub fn dequeue(&mut self) -> Result<T> {
        if self.count == 0 {
            return Err(LoggerError::BufferEmpty);
        }

        let item = self.slots[self.head]
            .take()
            .ok_or(LoggerError::BufferEmpty)?;
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        Ok(item)
    }

    /// The oldest item, if any
    pub fn peek(&self) -> Option<&T> {
        if self.count == 0 {
            None
        } else {
            self.slots[self.head].as_ref()
        }
    }

    /// Drop every live item and reset to empty; capacity is kept
    pub fn clear(&mut self) {
        let capacity = self.slots.len();
        for offset in 0..self.count {
            self.slots[(self.head + offset) % capacity] = None;
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Move every item of `self` into `other`, leaving `self` empty
    ///
    /// Whatever `other` held before is dropped. The transfer swaps the two
    /// storages instead of copying elements, so it is O(1) apart from
    /// clearing `other`; this keeps the lock guarding `self` held only
    /// briefly. Each buffer keeps its own ceiling: storage larger than
    /// `self`'s ceiling is not kept by `self`.
    pub fn drain_into(&mut self, other: &mut RingBuffer<T>) {
        other.clear();
        mem::swap(&mut self.slots, &mut other.slots);
        mem::swap(&mut self.head, &mut other.head);
        mem::swap(&mut self.tail, &mut other.tail);
        mem::swap(&mut self.count, &mut other.count);

        if self.slots.len() > self.max_capacity {
            let capacity = DEFAULT_CAPACITY.min(self.max_capacity);
            let mut slots = Vec::with_capacity(capacity);
            slots.resize_with(capacity, || None);
            self.slots = slots;
            self.head = 0;
            self.tail = 0;
        }
    }

    /// Dequeue every item in FIFO order
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain { buffer: self }
    }

    /// Iterate over live items from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.slots.len();
        (0..self.count).filter_map(move |offset| self.slots[(self.head + offset) % capacity].as_ref())
    }

    fn ensure_capacity(&mut self, min: usize) -> Result<()> {
        let capacity = self.slots.len();
        if capacity >= min {
            return Ok(());
        }

        let grown = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity.saturating_mul(2)
        };
        let new_capacity = grown.min(self.max_capacity);
        if new_capacity < min {
            return Err(LoggerError::capacity_exceeded(self.max_capacity));
        }

        // Unroll the live region into the front of the new storage
        let mut slots = Vec::with_capacity(new_capacity);
        for offset in 0..self.count {
            slots.push(self.slots[(self.head + offset) % capacity].take());
        }
        slots.resize_with(new_capacity, || None);

        self.slots = slots;
        self.head = 0;
        self.tail = self.count % new_capacity;
        Ok(())
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Draining iterator returned by [`RingBuffer::drain`]
pub struct Drain<'a, T> {
    buffer: &'a mut RingBuffer<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.buffer.dequeue().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.buffer.len(), Some(self.buffer.len()))
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_fifo_order() {
        let mut queue = RingBuffer::new();
        for i in 0..5 {
            queue.enqueue(i).unwrap();
        }
        assert_eq!(queue.dequeue().unwrap(), 0);
        assert_eq!(queue.dequeue().unwrap(), 1);
        queue.enqueue(5).unwrap();

        let rest: Vec<_> = queue.drain().collect();
        assert_eq!(rest, vec![2, 3, 4, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_growth_from_zero_and_doubling() {
        let mut queue = RingBuffer::new();
        assert_eq!(queue.capacity(), 0);

        queue.enqueue(1).unwrap();
        assert_eq!(queue.capacity(), DEFAULT_CAPACITY);

        for i in 0..DEFAULT_CAPACITY {
            queue.enqueue(i).unwrap();
        }
        assert_eq!(queue.capacity(), DEFAULT_CAPACITY * 2);
        assert_eq!(queue.len(), DEFAULT_CAPACITY + 1);
    }

    #[test]
    fn test_growth_preserves_wrapped_order() {
        let mut queue = RingBuffer::with_capacity(4);
        for i in 0..4 {
            queue.enqueue(i).unwrap();
        }
        // Move head forward so the live region wraps
        assert_eq!(queue.dequeue().unwrap(), 0);
        assert_eq!(queue.dequeue().unwrap(), 1);
        queue.enqueue(4).unwrap();
        queue.enqueue(5).unwrap();
        assert_eq!(queue.capacity(), 4);

        // Full and wrapped; this enqueue forces growth
        queue.enqueue(6).unwrap();
        assert_eq!(queue.capacity(), 8);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_dequeue_empty_is_error() {
        let mut queue: RingBuffer<u32> = RingBuffer::new();
        assert!(matches!(queue.dequeue(), Err(LoggerError::BufferEmpty)));
        assert!(queue.peek().is_none());
    }

    #[test]
    fn test_capacity_ceiling() {
        let mut queue = RingBuffer::with_max_capacity(2, 5);
        for i in 0..5 {
            queue.enqueue(i).unwrap();
        }
        assert_eq!(queue.capacity(), 5);

        let err = queue.enqueue(5).unwrap_err();
        assert!(matches!(err, LoggerError::CapacityExceeded { max: 5 }));
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_releases_items() {
        let tracked = Rc::new(());
        let mut queue = RingBuffer::new();
        for _ in 0..3 {
            queue.enqueue(Rc::clone(&tracked)).unwrap();
        }
        assert_eq!(Rc::strong_count(&tracked), 4);

        queue.clear();
        assert_eq!(Rc::strong_count(&tracked), 1);
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_drain_into_keeps_ceiling() {
        let mut capped = RingBuffer::with_max_capacity(4, 4);
        let mut scratch = RingBuffer::with_capacity(32);
        for i in 0..4 {
            capped.enqueue(i).unwrap();
        }

        capped.drain_into(&mut scratch);
        assert_eq!(scratch.len(), 4);
        assert!(capped.capacity() <= 4);

        let accepted = (0..40).filter(|i| capped.enqueue(*i).is_ok()).count();
        assert_eq!(accepted, 4);
        assert!(matches!(
            capped.enqueue(40),
            Err(LoggerError::CapacityExceeded { max: 4 })
        ));
    }

    #[test]
    fn test_drain_into_moves_contents() {
        let mut source = RingBuffer::new();
        let mut scratch = RingBuffer::new();
        scratch.enqueue("stale").unwrap();

        for line in ["a", "b", "c"] {
            source.enqueue(line).unwrap();
        }
        source.dequeue().unwrap();
        source.enqueue("d").unwrap();

        source.drain_into(&mut scratch);

        assert!(source.is_empty());
        assert_eq!(scratch.drain().collect::<Vec<_>>(), vec!["b", "c", "d"]);

        // The emptied source keeps accepting items
        source.enqueue("e").unwrap();
        assert_eq!(source.peek(), Some(&"e"));
    }
}
