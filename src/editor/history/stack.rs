//! Bounded LIFO stack for history entries.

use std::collections::VecDeque;

/// LIFO stack holding at most `capacity` items. Pushing onto a full stack evicts the
/// oldest item.
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedStack<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Push onto the top, returning the evicted bottom item if the stack was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound, evicting oldest items that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = BoundedStack::new(3);
        stack.push(1);
        stack.push(2);
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_overflow_evicts_oldest_only() {
        let mut stack = BoundedStack::new(3);
        for i in 0..3 {
            assert_eq!(stack.push(i), None);
        }
        assert_eq!(stack.push(3), Some(0));
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_shrinking_capacity_evicts_oldest() {
        let mut stack = BoundedStack::new(5);
        for i in 0..5 {
            stack.push(i);
        }
        stack.set_capacity(2);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek(), Some(&4));
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut stack = BoundedStack::new(0);
        stack.push('a');
        assert_eq!(stack.capacity(), 1);
        assert_eq!(stack.len(), 1);
    }
}
