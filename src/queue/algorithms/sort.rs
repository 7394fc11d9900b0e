use crate::queue::element::value_of;
use crate::queue::{connect, DetachedNodes, Link, Queue};
use std::cmp::Ordering;
use std::ptr::NonNull;
use tracing::debug;

impl Queue {
    /// Sort the queue in ascending byte-wise string order.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time. Nodes are
    /// relinked, never copied or reallocated.
    ///
    /// # Current Implementation
    ///
    /// The ghost node is taken out, leaving the elements as a cycle of their
    /// own. That cycle is halved with a slow and a fast pointer into two
    /// cycles, each half is sorted recursively, and the halves are merged
    /// back into one cycle, which is finally linked to the ghost node again.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["pear", "apple", "fig", "banana"]);
    ///
    /// queue.sort();
    ///
    /// assert_eq!(queue, Queue::from_iter(["apple", "banana", "fig", "pear"]));
    /// ```
    pub fn sort(&mut self) {
        merge_sort(self, |a, b| a < b);
    }

    /// Sort the queue with a comparator function.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// The comparator function must define a total ordering for the
    /// strings in the queue. If the ordering is not total, the order
    /// of the elements is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    /// let mut queue = Queue::from_iter(["ccc", "a", "bb"]);
    /// queue.sort_by(|a, b| a.len().cmp(&b.len()));
    /// assert_eq!(queue, Queue::from_iter(["a", "bb", "ccc"]));
    ///
    /// // reverse sorting
    /// queue.sort_by(|a, b| b.cmp(a));
    /// assert_eq!(queue, Queue::from_iter(["ccc", "bb", "a"]));
    /// ```
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        merge_sort(self, |a, b| compare(a, b) == Ordering::Less)
    }
}

fn merge_sort<F>(queue: &mut Queue, mut less: F)
where
    F: FnMut(&str, &str) -> bool,
{
    let detached = match queue.detach_all_nodes() {
        Some(detached) => detached,
        None => return,
    };
    // SAFETY: the detached range is owned here and no longer reachable from
    // the ghost node, so its nodes can be relinked freely before they are
    // attached back as one valid range.
    unsafe {
        connect(detached.back, detached.front);
        let front = sort_cycle(detached.front, &mut less);
        let back = front.as_ref().prev;
        let ghost = queue.ghost_node();
        queue.attach_nodes(ghost, ghost, DetachedNodes::new(front, back));
    }
    debug!(len = queue.size(), "sorted queue");
    queue.check_invariants();
}

/// Sorts a cycle of elements without a ghost node and returns its new front.
unsafe fn sort_cycle<F>(front: NonNull<Link>, less: &mut F) -> NonNull<Link>
where
    F: FnMut(&str, &str) -> bool,
{
    if front.as_ref().next == front {
        return front;
    }
    let (left, right) = split_cycle(front);
    let left = sort_cycle(left, less);
    let right = sort_cycle(right, less);
    merge_cycles(left, right, less)
}

/// Splits a cycle of at least two elements into two cycles, returning their
/// fronts. The first cycle takes the extra element of an odd length.
unsafe fn split_cycle(front: NonNull<Link>) -> (NonNull<Link>, NonNull<Link>) {
    // `slow` stops at the back of the first half.
    let (mut slow, mut fast) = (front, front);
    while fast.as_ref().next != front && fast.as_ref().next.as_ref().next != front {
        slow = slow.as_ref().next;
        fast = fast.as_ref().next.as_ref().next;
    }
    let (right, back) = (slow.as_ref().next, front.as_ref().prev);
    connect(slow, front);
    connect(back, right);
    (front, right)
}

/// Merges two sorted cycles into one sorted cycle and returns its front.
///
/// On equal strings, the element of `left` goes first.
unsafe fn merge_cycles<F>(left: NonNull<Link>, right: NonNull<Link>, less: &mut F) -> NonNull<Link>
where
    F: FnMut(&str, &str) -> bool,
{
    let (left_back, right_back) = (left.as_ref().prev, right.as_ref().prev);
    // A temporary front for the merged chain, never part of the result.
    let mut anchor = Link::dangling();
    let anchor = NonNull::from(&mut anchor);
    let mut back = anchor;
    let (mut l, mut r) = (Some(left), Some(right));
    while let (Some(ln), Some(rn)) = (l, r) {
        // A taken node's `next` is read before it is overwritten by the
        // following `connect`.
        let node = if less(value_of(rn), value_of(ln)) {
            r = step(rn, right_back);
            rn
        } else {
            l = step(ln, left_back);
            ln
        };
        connect(back, node);
        back = node;
    }
    // The nodes not taken yet are still chained up to their own back.
    let (rest, rest_back) = match (l, r) {
        (Some(ln), _) => (ln, left_back),
        (None, Some(rn)) => (rn, right_back),
        (None, None) => unreachable!("only one run is exhausted at a time"),
    };
    connect(back, rest);
    let front = anchor.as_ref().next;
    connect(rest_back, front);
    front
}

unsafe fn step(node: NonNull<Link>, back: NonNull<Link>) -> Option<NonNull<Link>> {
    if node == back {
        None
    } else {
        Some(node.as_ref().next)
    }
}
