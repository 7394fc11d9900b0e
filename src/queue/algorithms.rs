use crate::queue::element::value_of;
use crate::queue::{connect, Link, Queue};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ptr::NonNull;
use tracing::debug;

mod merge;
mod sort;

impl PartialEq for Queue {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other)
    }
}

impl Eq for Queue {}

impl PartialOrd for Queue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queue {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl Clone for Queue {
    fn clone(&self) -> Self {
        self.iter().collect()
    }
}

impl Hash for Queue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0_usize;
        for elt in self {
            elt.hash(state);
            len += 1;
        }
        len.hash(state);
    }
}

impl Queue {
    /// Returns `true` if the `Queue` contains a string equal to `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let queue = Queue::from_iter(["0", "1", "2"]);
    ///
    /// assert_eq!(queue.contains("0"), true);
    /// assert_eq!(queue.contains("10"), false);
    /// ```
    pub fn contains(&self, text: &str) -> bool {
        self.iter().any(|e| e == text)
    }

    /// Deletes the element at index ⌊*n*/2⌋ (counting from 0). Returns `false`
    /// if the queue is empty.
    ///
    /// The middle is found with a slow and a fast pointer both starting at
    /// the first element: the slow one advances one link for every two links
    /// of the fast one, until the fast one lands on or is about to pass the
    /// ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["1", "2", "3", "4"]);
    /// assert!(queue.delete_middle());
    /// assert_eq!(queue, Queue::from_iter(["1", "2", "4"]));
    /// ```
    pub fn delete_middle(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        let ghost = self.ghost_node();
        let (mut slow, mut fast) = (self.front_node(), self.front_node());
        // SAFETY: `fast` is checked against the ghost node before each link is
        // followed, so both pointers stay on live nodes, and `slow` never
        // reaches the ghost node of a non-empty queue.
        unsafe {
            while fast != ghost && fast.as_ref().next != ghost {
                slow = slow.as_ref().next;
                fast = fast.as_ref().next.as_ref().next;
            }
            drop(self.detach_node(slow));
        }
        self.check_invariants();
        true
    }

    /// Deletes every element whose string occurs more than once, leaving only
    /// the strings that occur exactly once. The queue must already be sorted.
    /// Returns `false` if the queue is empty.
    ///
    /// Each run of equal strings is measured before anything is removed, and
    /// a run longer than one is released as a whole, so the walk only ever
    /// compares live elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["1", "1", "2", "3", "3"]);
    /// assert!(queue.delete_duplicates());
    /// assert_eq!(queue, Queue::from_iter(["2"]));
    /// ```
    pub fn delete_duplicates(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        let ghost = self.ghost_node();
        let mut removed = 0;
        let mut run_front = self.front_node();
        // SAFETY: `run_front` and `run_end` only walk live nodes of the queue,
        // and a run is detached before it is released.
        unsafe {
            while run_front != ghost {
                let mut run_back = run_front;
                let mut run_end = run_front.as_ref().next;
                while run_end != ghost && value_of(run_end) == value_of(run_front) {
                    run_back = run_end;
                    run_end = run_end.as_ref().next;
                }
                if run_back != run_front {
                    removed += self.detach_nodes(run_front, run_back).release();
                }
                run_front = run_end;
            }
        }
        debug!(removed, "deleted duplicated strings");
        self.check_invariants();
        true
    }

    /// Reverses the order of the elements in place: every element is moved,
    /// in turn, right after the ghost node.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["a", "b", "c"]);
    /// queue.reverse();
    /// assert_eq!(queue, Queue::from_iter(["c", "b", "a"]));
    /// ```
    pub fn reverse(&mut self) {
        let ghost = self.ghost_node();
        let mut node = self.front_node();
        // SAFETY: the successor is read before `node` is moved, and moving a
        // node to the front keeps every other node linked.
        unsafe {
            while node != ghost {
                let next = node.as_ref().next;
                let front = self.front_node();
                if node != front {
                    move_node(node, front);
                }
                node = next;
            }
        }
        self.check_invariants();
    }

    /// Reverses every consecutive group of `k` elements in place. A trailing
    /// group shorter than `k` keeps its order, and `k <= 1` does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["1", "2", "3", "4", "5"]);
    /// queue.reverse_k_groups(2);
    /// assert_eq!(queue, Queue::from_iter(["2", "1", "4", "3", "5"]));
    ///
    /// let mut queue = Queue::from_iter(["1", "2", "3", "4", "5"]);
    /// queue.reverse_k_groups(3);
    /// assert_eq!(queue, Queue::from_iter(["3", "2", "1", "4", "5"]));
    /// ```
    pub fn reverse_k_groups(&mut self, k: usize) {
        if k <= 1 || self.is_empty() {
            return;
        }
        let ghost = self.ghost_node();
        // The node right before the group being reversed.
        let mut anchor = ghost;
        // SAFETY: `group_end` stops at the ghost node, so a group is only touched
        // when all of its `k` nodes are live elements, and each move keeps
        // the nodes outside the group linked.
        unsafe {
            'groups: loop {
                let group_front = anchor.as_ref().next;
                let mut group_end = group_front;
                for _ in 0..k {
                    if group_end == ghost {
                        break 'groups;
                    }
                    group_end = group_end.as_ref().next;
                }
                let mut node = group_front.as_ref().next;
                while node != group_end {
                    let next = node.as_ref().next;
                    move_node(node, anchor.as_ref().next);
                    node = next;
                }
                // The old group front is now the group back.
                anchor = group_front;
            }
        }
        self.check_invariants();
    }

    /// Swaps every two adjacent elements; same as `reverse_k_groups(2)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["1", "2", "3", "4"]);
    /// queue.swap_pairs();
    /// assert_eq!(queue, Queue::from_iter(["2", "1", "4", "3"]));
    /// ```
    #[inline]
    pub fn swap_pairs(&mut self) {
        self.reverse_k_groups(2);
    }

    /// Removes every element that has a strictly greater string anywhere to
    /// its right, and returns how many were removed.
    ///
    /// The queue is walked once from back to front. The elements kept so far
    /// form a stack that never decreases towards the front, with its top at
    /// the node right after the one being examined, so one comparison
    /// against that top decides each element.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["e", "b", "m", "c", "h"]);
    /// assert_eq!(queue.descend(), 3);
    /// assert_eq!(queue, Queue::from_iter(["m", "h"]));
    /// ```
    pub fn descend(&mut self) -> usize {
        let ghost = self.ghost_node();
        let mut kept = self.back_node();
        if kept == ghost {
            return 0;
        }
        let mut removed = 0;
        // SAFETY: the predecessor is read before `node` is detached, and
        // `kept` is always a live element.
        unsafe {
            let mut node = kept.as_ref().prev;
            while node != ghost {
                let prev = node.as_ref().prev;
                if value_of(node) < value_of(kept) {
                    drop(self.detach_node(node));
                    removed += 1;
                } else {
                    kept = node;
                }
                node = prev;
            }
        }
        debug!(removed, "removed elements followed by a greater one");
        self.check_invariants();
        removed
    }
}

unsafe fn move_node(from: NonNull<Link>, to: NonNull<Link>) {
    move_nodes(from, from, to);
}

/// Move the range `from_front..=from_back` to the position right before `to`.
///
/// `to` must not be inside the range.
unsafe fn move_nodes(from_front: NonNull<Link>, from_back: NonNull<Link>, to: NonNull<Link>) {
    debug_assert!(to != from_front, "cannot move nodes before themselves");
    connect(from_front.as_ref().prev, from_back.as_ref().next);
    connect(to.as_ref().prev, from_front);
    connect(from_back, to);
}

#[cfg(test)]
mod tests {
    use crate::Queue;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn values(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    #[test]
    fn queue_eq_ord_and_hash() {
        let a = Queue::from_iter(["a", "b"]);
        let b = a.clone();
        assert_eq!(a, b);
        assert!(a < Queue::from_iter(["a", "c"]));
        assert!(a > Queue::from_iter(["a"]));

        let hash = |queue: &Queue| {
            let mut hasher = DefaultHasher::new();
            queue.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&a), hash(&b));
        assert!(b.is_well_formed());
    }

    #[test]
    fn delete_middle_index() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            assert!(queue.delete_middle());
            assert_eq!(values(&queue), expected);
            assert!(queue.is_well_formed());
        }
        test_case(&["1", "2", "3", "4", "5"], &["1", "2", "4", "5"]);
        test_case(&["1", "2", "3", "4"], &["1", "2", "4"]);
        test_case(&["1", "2", "3"], &["1", "3"]);
        test_case(&["1", "2"], &["1"]);
        test_case(&["1"], &[]);

        let mut queue = Queue::new();
        assert!(!queue.delete_middle());
    }

    #[test]
    fn delete_duplicates_runs() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            assert!(queue.delete_duplicates());
            assert_eq!(values(&queue), expected);
            assert!(queue.is_well_formed());
        }
        test_case(&["1", "1", "2", "3", "3"], &["2"]);
        test_case(&["1", "2", "3"], &["1", "2", "3"]);
        test_case(&["1", "1", "1"], &[]);
        test_case(&["a", "b", "b", "b", "c", "d", "d"], &["a", "c"]);
        test_case(&["", "", "x"], &["x"]);
        test_case(&["solo"], &["solo"]);

        let mut queue = Queue::new();
        assert!(!queue.delete_duplicates());
    }

    #[test]
    fn reverse_twice_is_identity() {
        for len in 0..6 {
            let input: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let mut queue = Queue::from_iter(&input);
            queue.reverse();
            let reversed: Vec<&str> = input.iter().rev().map(String::as_str).collect();
            assert_eq!(values(&queue), reversed);
            assert!(queue.is_well_formed());
            queue.reverse();
            assert_eq!(queue, Queue::from_iter(&input));
        }
    }

    #[test]
    fn reverse_k_groups_boundaries() {
        fn test_case(input: &[&str], k: usize, expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            queue.reverse_k_groups(k);
            assert_eq!(values(&queue), expected);
            assert!(queue.is_well_formed());
        }
        let input = ["1", "2", "3", "4", "5", "6"];
        test_case(&input[..5], 2, &["2", "1", "4", "3", "5"]);
        test_case(&input, 2, &["2", "1", "4", "3", "6", "5"]);
        test_case(&input, 3, &["3", "2", "1", "6", "5", "4"]);
        test_case(&input, 4, &["4", "3", "2", "1", "5", "6"]);
        test_case(&input, 6, &["6", "5", "4", "3", "2", "1"]);
        test_case(&input, 7, &input);
        test_case(&input, 1, &input);
        test_case(&input, 0, &input);
        test_case(&[], 3, &[]);
    }

    #[test]
    fn swap_pairs_even_and_odd() {
        let mut queue = Queue::from_iter(["1", "2", "3", "4"]);
        queue.swap_pairs();
        assert_eq!(values(&queue), ["2", "1", "4", "3"]);

        let mut queue = Queue::from_iter(["1", "2", "3"]);
        queue.swap_pairs();
        assert_eq!(values(&queue), ["2", "1", "3"]);
        assert!(queue.is_well_formed());
    }

    #[test]
    fn descend_keeps_non_increasing_suffix() {
        fn test_case(input: &[&str], removed: usize, expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            assert_eq!(queue.descend(), removed);
            assert_eq!(values(&queue), expected);
            assert!(queue.is_well_formed());
        }
        test_case(&["e", "b", "m", "c", "h"], 3, &["m", "h"]);
        // Strings compare byte-wise, so "13" is smaller than "8".
        test_case(&["5", "13", "8"], 2, &["8"]);
        test_case(&["1", "1", "1"], 0, &["1", "1", "1"]);
        test_case(&["a", "b", "c"], 2, &["c"]);
        test_case(&["c", "b", "a"], 0, &["c", "b", "a"]);
        test_case(&["x"], 0, &["x"]);
        test_case(&[], 0, &[]);
    }

    #[test]
    fn contains_text() {
        let queue = Queue::from_iter(["cat", "dog"]);
        assert!(queue.contains("dog"));
        assert!(!queue.contains("do"));
    }
}
