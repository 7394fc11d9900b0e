//! This crate provides a queue of owned strings, built on an intrusive
//! circular doubly-linked list with a sentinel node.
//!
//! The [`Queue`] allows inserting and removing elements at both ends in
//! constant time, and rearranges its elements (reversal, group reversal,
//! merge sort, merging) purely by relinking nodes, never by copying them into
//! an array.
//!
//! Here is a quick example showing how the queue works.
//!
//! ```
//! use intrusive_queue::Queue;
//!
//! let mut queue = Queue::new();
//!
//! queue.insert_tail("banana").unwrap();
//! queue.insert_tail("cherry").unwrap();
//! queue.insert_head("apple").unwrap();
//! assert_eq!(queue.size(), 3);
//!
//! queue.reverse();
//! assert_eq!(queue, Queue::from_iter(["cherry", "banana", "apple"]));
//!
//! queue.sort();
//! let element = queue.remove_head(None).unwrap();
//! assert_eq!(element.value(), "apple");
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the queue is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                     (Ghost) Node N  │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        └───────────┘
//! │  ║  String   ║           ║  String   ║                           ↑   ↑
//! │  ╚═══════════╝           ╚═══════════╝                           │   │
//! │      Node 0                  Node 1                              │   │
//! └──────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                          │
//! ║   ghost   ║ ─────────────────────────────────────────────────────────┘
//! ╚═══════════╝
//!     Queue
//! ```
//! The `Queue` only holds a pointer to the ghost node. The ghost node is a
//! bare link pair (`next`, `prev`) with no payload.
//!
//! Each element node is allocated on heap and contains:
//! - the link pair, as its first field, so a pointer to the link pair is also
//!   a pointer to the node;
//! - the `String` it owns, copied from the inserted text.
//!
//! In an empty queue, the `next` and `prev` pointers of the ghost node point
//! to itself. Otherwise `ghost.next` is the first element and `ghost.prev` is
//! the last. There is no cached length: [`Queue::size`] walks the cycle.
//!
//! # Ownership
//!
//! The queue owns every element reachable from its ghost node. Removing an
//! element hands an [`Element`] to the caller, which owns the node from then
//! on; the detached node links only to itself. Dropping an `Element` or the
//! `Queue` releases the strings and nodes.
//!
//! # Errors
//!
//! Fallible operations report a [`QueueError`]. Inserts that cannot allocate
//! return [`QueueError::AllocationFailure`] and leave the queue unchanged.
//! The [`handle`] module exposes the same operations over possibly absent
//! queue handles.
//!
//! # Algorithms
//!
//! - [`Queue::delete_middle`]: removes the element at index ⌊*n*/2⌋;
//! - [`Queue::delete_duplicates`]: removes every string of a sorted queue
//!   that occurs more than once;
//! - [`Queue::reverse`], [`Queue::reverse_k_groups`], [`Queue::swap_pairs`];
//! - [`Queue::sort`]: stable merge sort over the link structure;
//! - [`Queue::descend`]: removes every element followed by a greater one;
//! - [`Queue::merge`]: merges sorted queues into one.
//!
//! # Features
//!
//! - `check-invariants`: every structural algorithm asserts the whole cycle
//!   is well formed on exit (see [`Queue::is_well_formed`]).

pub use error::{QueueError, Result};
#[doc(inline)]
pub use queue::element::Element;
#[doc(inline)]
pub use queue::iterator::{IntoIter, Iter};
#[doc(inline)]
pub use queue::Queue;

pub mod error;
pub mod handle;
pub mod queue;
