//! Fixed-capacity ring of past-episode average rewards

use std::collections::VecDeque;

/// Average reward per episode, oldest evicted first when full
#[derive(Debug, Clone)]
pub struct RewardHistory {
    capacity: usize,
    entries: VecDeque<f64>,
}

impl RewardHistory {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, average_reward: f64) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(average_reward);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.entries.back().copied()
    }

    /// Mean over the retained window
    pub fn mean(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries.iter().sum::<f64>() / self.entries.len() as f64)
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut history = RewardHistory::new(3);
        for value in [1.0, 2.0, 3.0] {
            history.push(value);
        }
        assert!(history.is_full());
        history.push(4.0);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(history.latest(), Some(4.0));
        assert_eq!(history.mean(), Some(3.0));
    }

    #[test]
    fn test_empty_history() {
        let history = RewardHistory::new(0);
        assert_eq!(history.capacity(), 1);
        assert!(history.is_empty());
        assert_eq!(history.mean(), None);
    }
}
