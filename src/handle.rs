//! Queue operations over possibly absent queue handles.
//!
//! A harness driving the queue may hold no queue at all (for example after a
//! failed [`new`]). These functions take `Option` handles and report every
//! outcome through [`Result`]:
//!
//! - [`QueueError::InvalidHandle`] for an absent queue;
//! - [`QueueError::EmptyQueue`] when there is nothing to remove or delete;
//! - [`QueueError::AllocationFailure`] when an insert cannot allocate.
//!
//! A failed call leaves the queue unchanged.
//!
//! # Examples
//!
//! ```
//! use intrusive_queue::{handle, QueueError};
//!
//! let mut queue = handle::new();
//! handle::insert_tail(queue.as_mut(), "dolphin").unwrap();
//! assert_eq!(handle::size(queue.as_ref()), 1);
//!
//! let mut buffer = [0_u8; 8];
//! let element = handle::remove_head(queue.as_mut(), Some(&mut buffer)).unwrap();
//! assert_eq!(element.value(), "dolphin");
//! assert_eq!(
//!     handle::remove_head(queue.as_mut(), None).unwrap_err(),
//!     QueueError::EmptyQueue
//! );
//!
//! handle::free(queue);
//! assert_eq!(handle::size(None), 0);
//! assert_eq!(handle::insert_head(None, "x"), Err(QueueError::InvalidHandle));
//! ```

use crate::error::{QueueError, Result};
use crate::queue::element::Element;
use crate::queue::Queue;

fn get(queue: Option<&mut Queue>) -> Result<&mut Queue> {
    queue.ok_or(QueueError::InvalidHandle)
}

/// Creates an empty queue, or returns `None` if it cannot be allocated.
pub fn new() -> Option<Queue> {
    Queue::try_new().ok()
}

/// Releases the queue with every element it owns. Does nothing for `None`.
pub fn free(queue: Option<Queue>) {
    drop(queue);
}

/// See [`Queue::insert_head`].
pub fn insert_head(queue: Option<&mut Queue>, text: &str) -> Result<()> {
    get(queue)?.insert_head(text)
}

/// See [`Queue::insert_tail`].
pub fn insert_tail(queue: Option<&mut Queue>, text: &str) -> Result<()> {
    get(queue)?.insert_tail(text)
}

/// See [`Queue::remove_head`].
pub fn remove_head(queue: Option<&mut Queue>, buffer: Option<&mut [u8]>) -> Result<Element> {
    get(queue)?
        .remove_head(buffer)
        .ok_or(QueueError::EmptyQueue)
}

/// See [`Queue::remove_tail`].
pub fn remove_tail(queue: Option<&mut Queue>, buffer: Option<&mut [u8]>) -> Result<Element> {
    get(queue)?
        .remove_tail(buffer)
        .ok_or(QueueError::EmptyQueue)
}

/// Number of elements, or 0 for an absent queue.
pub fn size(queue: Option<&Queue>) -> usize {
    queue.map_or(0, Queue::size)
}

/// See [`Queue::delete_middle`].
pub fn delete_middle(queue: Option<&mut Queue>) -> Result<()> {
    if get(queue)?.delete_middle() {
        Ok(())
    } else {
        Err(QueueError::EmptyQueue)
    }
}

/// See [`Queue::delete_duplicates`].
pub fn delete_duplicates(queue: Option<&mut Queue>) -> Result<()> {
    if get(queue)?.delete_duplicates() {
        Ok(())
    } else {
        Err(QueueError::EmptyQueue)
    }
}

/// See [`Queue::reverse`].
pub fn reverse(queue: Option<&mut Queue>) -> Result<()> {
    get(queue)?.reverse();
    Ok(())
}

/// See [`Queue::reverse_k_groups`].
pub fn reverse_k_groups(queue: Option<&mut Queue>, k: usize) -> Result<()> {
    get(queue)?.reverse_k_groups(k);
    Ok(())
}

/// See [`Queue::swap_pairs`].
pub fn swap_pairs(queue: Option<&mut Queue>) -> Result<()> {
    get(queue)?.swap_pairs();
    Ok(())
}

/// See [`Queue::sort`].
pub fn sort(queue: Option<&mut Queue>) -> Result<()> {
    get(queue)?.sort();
    Ok(())
}

/// See [`Queue::descend`].
pub fn descend(queue: Option<&mut Queue>) -> Result<usize> {
    Ok(get(queue)?.descend())
}

/// See [`Queue::merge`].
pub fn merge(queues: Option<&mut [Queue]>) -> Result<usize> {
    queues.map(Queue::merge).ok_or(QueueError::InvalidHandle)
}
