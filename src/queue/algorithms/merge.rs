use crate::queue::element::value_of;
use crate::queue::Queue;
use tracing::debug;

impl Queue {
    /// Merges the sorted queue `other` into this sorted queue by relinking its
    /// nodes, leaving `other` empty.
    ///
    /// On equal strings, elements already in `self` stay first.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* + *m*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["a", "c", "e"]);
    /// let mut other = Queue::from_iter(["b", "c", "d", "f"]);
    ///
    /// queue.merge_sorted(&mut other);
    ///
    /// assert_eq!(queue, Queue::from_iter(["a", "b", "c", "c", "d", "e", "f"]));
    /// assert!(other.is_empty());
    /// ```
    pub fn merge_sorted(&mut self, other: &mut Queue) {
        let ghost = self.ghost_node();
        let other_ghost = other.ghost_node();
        let mut at = self.front_node();
        // SAFETY: `at` walks live nodes of `self`, and every range moved over
        // is a valid range of `other` that is detached before it is attached
        // right before `at`.
        unsafe {
            loop {
                let front = other.front_node();
                if front == other_ghost {
                    break;
                }
                if at == ghost {
                    self.append(other);
                    break;
                }
                if value_of(front) < value_of(at) {
                    // Move the whole run of `other` that goes before `at`.
                    let mut back = front;
                    loop {
                        let next = back.as_ref().next;
                        if next == other_ghost || value_of(next) >= value_of(at) {
                            break;
                        }
                        back = next;
                    }
                    let detached = other.detach_nodes(front, back);
                    self.attach_nodes(at.as_ref().prev, at, detached);
                } else {
                    at = at.as_ref().next;
                }
            }
        }
        self.check_invariants();
    }

    /// Merges sorted queues into `queues[0]` and returns its resulting size.
    /// Every other queue is left empty, and an empty slice returns 0.
    ///
    /// Queues are merged pairwise in rounds: neighbours first, then queues
    /// two apart, four apart, and so on, so each element is relinked
    /// *O*(log *k*) times.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queues = vec![
    ///     Queue::from_iter(["a", "d"]),
    ///     Queue::from_iter(["b", "e"]),
    ///     Queue::from_iter(["c", "f"]),
    /// ];
    ///
    /// assert_eq!(Queue::merge(&mut queues), 6);
    /// assert_eq!(queues[0], Queue::from_iter(["a", "b", "c", "d", "e", "f"]));
    /// assert!(queues[1].is_empty() && queues[2].is_empty());
    /// ```
    pub fn merge(queues: &mut [Queue]) -> usize {
        let count = queues.len();
        let mut stride = 1;
        while stride < count {
            let mut i = 0;
            while i + stride < count {
                let (head, tail) = queues.split_at_mut(i + stride);
                head[i].merge_sorted(&mut tail[0]);
                i += stride * 2;
            }
            stride *= 2;
        }
        let total = queues.first().map_or(0, Queue::size);
        debug!(queues = count, total, "merged sorted queues");
        total
    }
}

#[cfg(test)]
mod tests {
    use crate::Queue;

    fn values(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    #[test]
    fn merge_sorted_pairs() {
        fn test_case(list: &[&str], other: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(list);
            let mut other = Queue::from_iter(other);
            queue.merge_sorted(&mut other);
            assert_eq!(values(&queue), expected);
            assert!(other.is_empty());
            assert!(queue.is_well_formed());
            assert!(other.is_well_formed());
        }
        test_case(&["a", "c"], &["b", "d"], &["a", "b", "c", "d"]);
        test_case(&["c", "d"], &["a", "b"], &["a", "b", "c", "d"]);
        test_case(&["a", "b"], &["c", "d"], &["a", "b", "c", "d"]);
        test_case(&[], &["a"], &["a"]);
        test_case(&["a"], &[], &["a"]);
        test_case(&[], &[], &[]);
    }

    #[test]
    fn merge_sorted_keeps_self_first_on_ties() {
        let mut queue = Queue::from_iter(["b", "b"]);
        let mut other = Queue::from_iter(["a", "b", "c"]);
        let other_b = other.iter().nth(1).unwrap().as_ptr();
        queue.merge_sorted(&mut other);
        let merged: Vec<&str> = queue.iter().collect();
        assert_eq!(merged, ["a", "b", "b", "b", "c"]);
        // The `b` that came from `other` is the last one.
        assert_eq!(merged[3].as_ptr(), other_b);
    }

    #[test]
    fn merge_many_queues() {
        let mut queues: Vec<Queue> = (0..7)
            .map(|q| {
                let values: Vec<String> = (0..5).map(|i| format!("{:02}", i * 7 + q)).collect();
                Queue::from_iter(&values)
            })
            .collect();
        assert_eq!(Queue::merge(&mut queues), 35);

        let expected: Vec<String> = (0..35).map(|i| format!("{:02}", i)).collect();
        assert_eq!(queues[0], Queue::from_iter(&expected));
        assert!(queues[1..].iter().all(Queue::is_empty));
        assert!(queues[0].is_well_formed());
    }

    #[test]
    fn merge_edge_counts() {
        assert_eq!(Queue::merge(&mut []), 0);

        let mut queues = vec![Queue::from_iter(["x", "y"])];
        assert_eq!(Queue::merge(&mut queues), 2);

        let mut queues = vec![Queue::new(), Queue::from_iter(["k"]), Queue::new()];
        assert_eq!(Queue::merge(&mut queues), 1);
        assert_eq!(queues[0].front(), Some("k"));
    }
}
