use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use tracing::warn;

use crate::error::{QueueError, Result};
use crate::queue::Link;

/// A queue node: the link pair comes first, so a pointer to the link pair is
/// also a pointer to the node.
#[repr(C)]
pub(crate) struct Node {
    pub(crate) link: Link,
    pub(crate) value: String,
}

impl Node {
    /// Create a detached, self-linked node owning a copy of `text`.
    ///
    /// The node storage is allocated first and released again if the string
    /// storage cannot be allocated.
    pub(crate) fn try_new_detached(text: &str) -> Result<NonNull<Link>> {
        let layout = Layout::new::<Node>();
        // SAFETY: `Node` is not zero-sized.
        let raw = unsafe { alloc::alloc(layout) }.cast::<Node>();
        let node = NonNull::new(raw).ok_or_else(|| {
            warn!(len = text.len(), "failed to allocate a node");
            QueueError::AllocationFailure
        })?;
        let value = match copy_text(text) {
            Ok(value) => value,
            Err(err) => {
                warn!(len = text.len(), "failed to allocate string storage");
                // SAFETY: `raw` was allocated above with `layout` and has not
                // been initialized, so there is nothing to drop.
                unsafe { alloc::dealloc(raw.cast(), layout) };
                return Err(err);
            }
        };
        let link = node.cast::<Link>();
        // SAFETY: `node` is valid for writes of a `Node`.
        unsafe {
            node.as_ptr().write(Node {
                link: Link {
                    next: link,
                    prev: link,
                },
                value,
            })
        };
        Ok(link)
    }
}

/// Copies `text` into storage reserved for exactly its length.
fn copy_text(text: &str) -> Result<String> {
    let mut value = String::new();
    value
        .try_reserve_exact(text.len())
        .map_err(|_| QueueError::AllocationFailure)?;
    value.push_str(text);
    Ok(value)
}

/// Borrows the string of the element linked at `link`.
///
/// # Safety
///
/// `link` must be a live non-ghost node, and stay so for `'a`.
pub(crate) unsafe fn value_of<'a>(link: NonNull<Link>) -> &'a str {
    &(*link.cast::<Node>().as_ptr()).value
}

/// An element detached from its queue.
///
/// Ownership of the node and its string moved to the holder: dropping the
/// `Element` releases both. A detached element is self-linked, so it never
/// points into its old queue.
///
/// # Examples
///
/// ```
/// use intrusive_queue::Queue;
///
/// let mut queue = Queue::from_iter(["cat"]);
/// let element = queue.remove_head(None).unwrap();
/// assert!(element.is_detached());
/// assert_eq!(element.value(), "cat");
/// assert_eq!(element.into_value(), "cat");
/// ```
pub struct Element {
    node: NonNull<Node>,
    _marker: PhantomData<Box<Node>>,
}

impl Element {
    /// Takes ownership of a node that is no longer reachable from any queue,
    /// and resets its links to point at itself.
    ///
    /// # Safety
    ///
    /// `link` must be a non-ghost node allocated by [`Node::try_new_detached`],
    /// and no queue may still link to it.
    pub(crate) unsafe fn from_detached(mut link: NonNull<Link>) -> Self {
        link.as_mut().next = link;
        link.as_mut().prev = link;
        Self {
            node: link.cast(),
            _marker: PhantomData,
        }
    }

    /// The string held by the element.
    pub fn value(&self) -> &str {
        // SAFETY: the element exclusively owns a live node.
        unsafe { &self.node.as_ref().value }
    }

    /// Returns `true` if the element links only to itself.
    pub fn is_detached(&self) -> bool {
        let link = self.node.cast::<Link>();
        // SAFETY: the element exclusively owns a live node.
        let node = unsafe { self.node.as_ref() };
        node.link.next == link && node.link.prev == link
    }

    /// Releases the node and moves the string out.
    pub fn into_value(self) -> String {
        let this = ManuallyDrop::new(self);
        // SAFETY: the node was allocated with the layout of `Node` by the global
        // allocator, and `this` is never dropped, so it is freed exactly once.
        let node = unsafe { Box::from_raw(this.node.as_ptr()) };
        node.value
    }

    /// Copies the string into `buffer` as a NUL-terminated byte string and
    /// returns how many string bytes were copied.
    ///
    /// At most `buffer.len() - 1` bytes are copied, the byte after them is
    /// set to NUL, and the rest of the buffer is zero-filled. Nothing is
    /// written to an empty buffer. Truncation is by bytes, so it may split a
    /// multi-byte character.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["dolphin"]);
    /// let element = queue.remove_head(None).unwrap();
    ///
    /// let mut buffer = [0xff_u8; 5];
    /// assert_eq!(element.copy_into(&mut buffer), 4);
    /// assert_eq!(&buffer, b"dolp\0");
    ///
    /// let mut buffer = [0xff_u8; 10];
    /// assert_eq!(element.copy_into(&mut buffer), 7);
    /// assert_eq!(&buffer, b"dolphin\0\0\0");
    /// ```
    pub fn copy_into(&self, buffer: &mut [u8]) -> usize {
        let capacity = match buffer.len().checked_sub(1) {
            Some(capacity) => capacity,
            None => return 0,
        };
        let bytes = self.value().as_bytes();
        let copied = bytes.len().min(capacity);
        buffer[..copied].copy_from_slice(&bytes[..copied]);
        buffer[copied..].fill(0);
        copied
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&self.value()).finish()
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        // SAFETY: the node was allocated with the layout of `Node` by the global
        // allocator, and the element is its only owner.
        drop(unsafe { Box::from_raw(self.node.as_ptr()) });
    }
}

unsafe impl Send for Element {}

unsafe impl Sync for Element {}

#[cfg(test)]
mod tests {
    use super::{Element, Node};

    #[test]
    fn element_detached_node() {
        let link = Node::try_new_detached("walrus").unwrap();
        // SAFETY: the node was just allocated and belongs to no queue.
        let element = unsafe { Element::from_detached(link) };
        assert!(element.is_detached());
        assert_eq!(element.value(), "walrus");
        assert_eq!(format!("{:?}", element), "Element(\"walrus\")");
    }

    #[test]
    fn element_empty_text() {
        let link = Node::try_new_detached("").unwrap();
        let element = unsafe { Element::from_detached(link) };
        assert_eq!(element.value(), "");

        let mut buffer = [0xff_u8; 3];
        assert_eq!(element.copy_into(&mut buffer), 0);
        assert_eq!(buffer, [0, 0, 0]);
        assert_eq!(element.into_value(), "");
    }

    #[test]
    fn element_copy_into_exact_fit() {
        let link = Node::try_new_detached("abc").unwrap();
        let element = unsafe { Element::from_detached(link) };

        let mut buffer = [0xff_u8; 4];
        assert_eq!(element.copy_into(&mut buffer), 3);
        assert_eq!(&buffer, b"abc\0");

        let mut buffer = [0xff_u8; 3];
        assert_eq!(element.copy_into(&mut buffer), 2);
        assert_eq!(&buffer, b"ab\0");

        let mut buffer: [u8; 0] = [];
        assert_eq!(element.copy_into(&mut buffer), 0);
    }
}
