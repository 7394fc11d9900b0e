//! Allocation accounting for the queue.
//!
//! The global allocator of this test binary counts live allocations per
//! thread and can be told to fail one upcoming allocation, so leaks, double
//! frees and allocation-failure paths are all observable.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ptr;

use intrusive_queue::{handle, Queue, QueueError};

struct TrackingAllocator;

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static FAIL_AFTER: Cell<Option<usize>> = const { Cell::new(None) };
}

fn should_fail() -> bool {
    FAIL_AFTER
        .try_with(|fail_after| match fail_after.get() {
            Some(0) => {
                fail_after.set(None);
                true
            }
            Some(n) => {
                fail_after.set(Some(n - 1));
                false
            }
            None => false,
        })
        .unwrap_or(false)
}

fn track(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if should_fail() {
            return ptr::null_mut();
        }
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            track(1);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        track(-1);
    }
}

/// Live allocations made by the current thread.
fn live() -> isize {
    LIVE.with(Cell::get)
}

/// Lets `successes` allocations through, then fails exactly one.
fn fail_after(successes: usize) {
    FAIL_AFTER.with(|fail_after| fail_after.set(Some(successes)));
}

fn disarm() {
    FAIL_AFTER.with(|fail_after| fail_after.set(None));
}

/// Runs every queue operation once, so lazily initialized state (such as
/// tracing callsites) is in place before anything is measured.
fn session() {
    let mut queue = handle::new();
    for text in ["delta", "alpha", "charlie", "alpha", "bravo", "echo"] {
        handle::insert_tail(queue.as_mut(), text).unwrap();
    }
    handle::insert_head(queue.as_mut(), "foxtrot").unwrap();

    let mut buffer = [0_u8; 4];
    let element = handle::remove_head(queue.as_mut(), Some(&mut buffer)).unwrap();
    assert_eq!(element.value(), "foxtrot");
    drop(element);
    let element = handle::remove_tail(queue.as_mut(), None).unwrap();
    assert_eq!(element.into_value(), "echo");

    handle::sort(queue.as_mut()).unwrap();
    handle::delete_duplicates(queue.as_mut()).unwrap();
    handle::reverse(queue.as_mut()).unwrap();
    handle::reverse_k_groups(queue.as_mut(), 3).unwrap();
    handle::swap_pairs(queue.as_mut()).unwrap();
    handle::delete_middle(queue.as_mut()).unwrap();
    handle::descend(queue.as_mut()).unwrap();
    handle::sort(queue.as_mut()).unwrap();

    let mut queues = vec![
        queue.take().unwrap(),
        Queue::from_iter(["able", "zulu"]),
        Queue::new(),
    ];
    handle::merge(Some(queues.as_mut_slice())).unwrap();
    drop(queues);

    let mut queue = Queue::from_iter(["a", "b", "c"]);
    queue.clear();
    handle::free(Some(queue));
    handle::free(None);

    // Failure paths are part of the session too.
    let mut queue = Queue::new();
    fail_after(1);
    assert!(queue.insert_tail("lost").is_err());
    fail_after(0);
    assert!(queue.insert_head("lost").is_err());
    fail_after(0);
    assert!(Queue::try_new().is_err());
    disarm();
}

#[test]
fn every_operation_releases_its_memory() {
    session();
    let before = live();
    session();
    assert_eq!(live(), before);
}

#[test]
fn elements_own_their_allocations() {
    session();
    let mut queue = Queue::from_iter(["one", "two", "three"]);

    // A removed element keeps its node and string until it is dropped.
    let before = live();
    let element = queue.remove_head(None).unwrap();
    assert_eq!(live(), before);
    drop(element);
    assert_eq!(live(), before - 2);

    // Taking the string out releases only the node.
    let value = queue.pop_back().unwrap();
    assert_eq!(live(), before - 3);
    drop(value);
    assert_eq!(live(), before - 4);

    // Dropping the queue releases the last element and the ghost node.
    drop(queue);
    assert_eq!(live(), before - 7);
}

#[test]
fn relinking_operations_do_not_allocate() {
    session();
    let mut queue = Queue::from_iter(["kilo", "alpha", "kilo", "echo", "golf", "echo", "bravo"]);

    let before = live();
    queue.reverse();
    queue.reverse_k_groups(3);
    queue.swap_pairs();
    queue.sort();
    assert_eq!(live(), before);

    // The node and string of `hotel` move over, the ghost node of `other`
    // stays behind.
    let mut other = Queue::from_iter(["hotel"]);
    assert_eq!(live(), before + 3);
    queue.merge_sorted(&mut other);
    assert_eq!(live(), before + 3);
    drop(other);
    assert_eq!(live(), before + 2);
    assert!(queue.is_well_formed());
    assert_eq!(queue.size(), 8);
}

#[test]
fn deleting_releases_nodes_and_strings() {
    session();
    let mut queue = Queue::from_iter(["a1", "a1", "b2", "c3", "c3", "c3", "d4"]);
    let before = live();

    assert!(queue.delete_duplicates());
    assert_eq!(live(), before - 10);
    assert_eq!(queue, Queue::from_iter(["b2", "d4"]));

    assert!(queue.delete_middle());
    assert_eq!(live(), before - 12);
    assert_eq!(queue.front(), Some("b2"));

    assert_eq!(queue.descend(), 0);
    queue.insert_tail("z9").unwrap();
    assert_eq!(queue.descend(), 1);
    assert_eq!(live(), before - 12);
}

#[test]
fn failed_string_allocation_leaves_queue_unchanged() {
    session();
    let mut queue = Queue::from_iter(["first", "second"]);
    let before = live();

    // The node is allocated, its string storage is not.
    fail_after(1);
    assert_eq!(queue.insert_tail("third"), Err(QueueError::AllocationFailure));
    assert_eq!(live(), before);

    fail_after(1);
    assert_eq!(
        handle::insert_head(Some(&mut queue), "zeroth"),
        Err(QueueError::AllocationFailure)
    );
    assert_eq!(live(), before);
    disarm();

    assert!(queue.is_well_formed());
    assert_eq!(queue, Queue::from_iter(["first", "second"]));
}

#[test]
fn failed_node_allocation_leaves_queue_unchanged() {
    session();
    let mut queue = Queue::from_iter(["only"]);
    let before = live();

    fail_after(0);
    assert_eq!(queue.insert_head("never"), Err(QueueError::AllocationFailure));
    assert_eq!(live(), before);
    disarm();

    assert_eq!(queue.size(), 1);
    assert_eq!(queue.front(), Some("only"));
}

#[test]
fn failed_queue_allocation() {
    session();
    let before = live();

    fail_after(0);
    assert_eq!(Queue::try_new().err(), Some(QueueError::AllocationFailure));
    assert_eq!(live(), before);

    fail_after(0);
    assert!(handle::new().is_none());
    assert_eq!(live(), before);
    disarm();
}
