use crate::error::Result as QueueResult;
use crate::queue::element::{value_of, Element, Node};
use crate::queue::{Link, Queue};
use std::fmt;
use std::fmt::Formatter;
use std::ptr::NonNull;

/// A cursor over a `Queue`.
///
/// A `Cursor` is like an iterator, except that it can freely seek back-and-forth.
///
/// In a queue with *n* elements, there are *n* + 1 valid locations for the
/// cursor: the elements and the ghost node behind the last one.
///
/// # Examples
///
/// Here is a simple example showing how the cursors work. (The ghost node of the
/// queue is denoted by `#`).
/// ```
/// use intrusive_queue::Queue;
///
/// // Create a queue: [ A B C #]
/// let queue = Queue::from_iter(["A", "B", "C"]);
///
/// // Create a cursor at start: [|A B C #]
/// let mut cursor = queue.cursor_start();
/// assert_eq!(cursor.current(), Some("A"));
///
/// // Move cursor forward: [ A|B C #]
/// assert!(cursor.move_next().is_ok());
/// assert_eq!(cursor.current(), Some("B"));
///
/// // Create a cursor in the end: [ A B C|#]
/// let mut cursor = queue.cursor_end();
/// assert_eq!(cursor.current(), None);
/// assert!(cursor.move_next().is_err());
///
/// // Move cursor forward, cyclically: [|A B C #]
/// cursor.move_next_cyclic();
/// assert_eq!(cursor.current(), Some("A"));
/// ```
#[derive(Clone)]
pub struct Cursor<'a> {
    pub(crate) current: NonNull<Link>,
    pub(crate) queue: &'a Queue,
}

/// Compare cursors by its position.
///
/// Only cursors belong to the same queue and have the same positions
/// are considered equal.
impl<'a> PartialEq for Cursor<'a> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.queue, other.queue) && self.current == other.current
    }
}

impl<'a> Eq for Cursor<'a> {}

/// A cursor over a `Queue` with editing operations.
///
/// Removing the current element moves the cursor to the next one; inserting
/// puts the new element before the current one.
pub struct CursorMut<'a> {
    pub(crate) current: NonNull<Link>,
    pub(crate) queue: &'a mut Queue,
}

macro_rules! impl_cursor {
    ($CURSOR:ident) => {
        // Private methods
        impl<'a> $CURSOR<'a> {
            pub(crate) fn is_ghost_node(&self) -> bool {
                self.current == self.queue.ghost_node()
            }
            pub(crate) fn is_front_node(&self) -> bool {
                self.prev_node() == self.queue.ghost_node()
            }
            pub(crate) fn next_node(&self) -> NonNull<Link> {
                // SAFETY: `current.next` is always valid since it is a cyclic list.
                unsafe { self.current.as_ref().next }
            }
            pub(crate) fn prev_node(&self) -> NonNull<Link> {
                // SAFETY: `current.prev` is always valid since it is a cyclic list.
                unsafe { self.current.as_ref().prev }
            }
        }

        impl<'a> $CURSOR<'a> {
            /// Returns `true` if the queue under the cursor is empty.
            pub fn is_empty(&self) -> bool {
                self.queue.is_empty()
            }

            /// Move the cursor to the next node, crossing the ghost node boundary
            /// if needed. Does nothing on an empty queue.
            pub fn move_next_cyclic(&mut self) {
                if self.is_empty() {
                    return;
                }
                self.current = self.next_node();
            }

            /// Move the cursor to the previous node, crossing the ghost node
            /// boundary if needed. Does nothing on an empty queue.
            pub fn move_prev_cyclic(&mut self) {
                if self.is_empty() {
                    return;
                }
                self.current = self.prev_node();
            }

            /// Move the cursor to the next node, failing at the ghost node.
            pub fn move_next(&mut self) -> Result<(), &'static str> {
                if !self.is_empty() && !self.is_ghost_node() {
                    self.move_next_cyclic();
                    return Ok(());
                }
                Err("`move_next` across ghost boundary")
            }

            /// Move the cursor to the previous node, failing at the first node.
            pub fn move_prev(&mut self) -> Result<(), &'static str> {
                if !self.is_empty() && !self.is_front_node() {
                    self.move_prev_cyclic();
                    return Ok(());
                }
                Err("`move_prev` across ghost boundary")
            }

            /// Move the cursor forward by `steps`. On failure, the cursor stops
            /// at the ghost node and the number of steps taken is returned.
            pub fn seek_forward(&mut self, steps: usize) -> Result<(), usize> {
                (0..steps).try_for_each(|i| self.move_next().map_err(|_| i))
            }

            /// Move the cursor backward by `steps`. On failure, the cursor stops
            /// at the first node and the number of steps taken is returned.
            pub fn seek_backward(&mut self, steps: usize) -> Result<(), usize> {
                (0..steps).try_for_each(|i| self.move_prev().map_err(|_| i))
            }

            #[inline]
            pub fn move_to_start(&mut self) {
                self.current = self.queue.front_node();
            }

            #[inline]
            pub fn move_to_end(&mut self) {
                self.current = self.queue.ghost_node();
            }
        }

        impl<'a> fmt::Debug for $CURSOR<'a> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($CURSOR))
                    .field("queue", &self.queue)
                    .field("current", &self.current())
                    .finish()
            }
        }
    };
}

impl_cursor!(CursorMut);
impl_cursor!(Cursor);

impl<'a> Cursor<'a> {
    pub(crate) fn new(queue: &'a Queue, current: NonNull<Link>) -> Self {
        Self { current, queue }
    }

    /// The string at the cursor, or `None` at the ghost node.
    pub fn current(&self) -> Option<&'a str> {
        if self.is_ghost_node() {
            return None;
        }
        // SAFETY: non-ghost nodes hold a valid string, and the queue is
        // borrowed for `'a`.
        Some(unsafe { value_of(self.current) })
    }

    /// The string before the cursor, or `None` at the first node.
    pub fn previous(&self) -> Option<&'a str> {
        if self.is_front_node() {
            return None;
        }
        // SAFETY: the previous node of a non-first node is never the ghost node.
        Some(unsafe { value_of(self.prev_node()) })
    }
}

impl<'a> CursorMut<'a> {
    pub(crate) fn new(queue: &'a mut Queue, current: NonNull<Link>) -> Self {
        Self { current, queue }
    }
}

// Methods that does not change the linking structure of the queue.
impl<'a> CursorMut<'a> {
    /// The string at the cursor, or `None` at the ghost node.
    pub fn current(&self) -> Option<&str> {
        if self.is_ghost_node() {
            return None;
        }
        // SAFETY: non-ghost nodes hold a valid string, and it cannot be
        // removed while `self` is borrowed.
        Some(unsafe { value_of(self.current) })
    }

    /// The string before the cursor, or `None` at the first node.
    pub fn previous(&self) -> Option<&str> {
        if self.is_front_node() {
            return None;
        }
        // SAFETY: the previous node of a non-first node is never the ghost node.
        Some(unsafe { value_of(self.prev_node()) })
    }

    pub fn as_cursor(&self) -> Cursor<'_> {
        Cursor::new(self.queue, self.current)
    }

    pub fn into_cursor(self) -> Cursor<'a> {
        Cursor::new(self.queue, self.current)
    }

    pub fn view(&self) -> &Queue {
        self.queue
    }
}

// Methods that might change the linking structure of the queue.
impl<'a> CursorMut<'a> {
    /// Insert a copy of `text` before the cursor. The cursor keeps pointing
    /// at the same node.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["a", "c"]);
    /// let mut cursor = queue.cursor_start_mut();
    /// cursor.move_next().unwrap();
    /// cursor.insert("b").unwrap();
    /// assert_eq!(cursor.current(), Some("c"));
    /// assert_eq!(queue, Queue::from_iter(["a", "b", "c"]));
    /// ```
    pub fn insert(&mut self, text: &str) -> QueueResult<()> {
        let node = Node::try_new_detached(text)?;
        let prev = self.prev_node();
        // SAFETY: `prev` and `current` are adjacent nodes of the queue, and
        // `node` is a fresh detached node.
        unsafe { self.queue.attach_node(prev, self.current, node) };
        Ok(())
    }

    /// Detach the element at the cursor and hand it over, moving the cursor
    /// to the next node. Returns `None` at the ghost node.
    pub fn remove(&mut self) -> Option<Element> {
        if self.is_ghost_node() {
            return None;
        }
        let (current, next) = (self.current, self.next_node());
        self.current = next;
        // SAFETY: `current` is a valid non-ghost node in the queue, so it is safe.
        Some(unsafe { self.queue.detach_node(current) })
    }

    /// Detach the element before the cursor and hand it over. Returns `None`
    /// at the first node.
    pub fn backspace(&mut self) -> Option<Element> {
        self.move_prev().ok().and_then(|_| self.remove())
    }

    /// Split the queue into two at the cursor: everything from the cursor to
    /// the end is moved into a new queue, and the cursor is left at the ghost
    /// node. Returns `None` at the ghost node.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::from_iter(["a", "b", "c"]);
    /// let mut cursor = queue.cursor_start_mut();
    /// cursor.move_next().unwrap();
    /// let split = cursor.split().unwrap();
    /// assert_eq!(split, Queue::from_iter(["b", "c"]));
    /// assert_eq!(queue, Queue::from_iter(["a"]));
    /// ```
    pub fn split(&mut self) -> Option<Queue> {
        if self.is_ghost_node() {
            return None;
        }
        // After splitting, the cursor is pointing to the ghost node.
        let (current, back) = (self.current, self.queue.back_node());
        self.current = self.queue.ghost_node();
        // SAFETY: since current is a non-ghost node, the range from current to
        // the back node is a valid range in the queue, and thus it is safe.
        unsafe { Some(Queue::from_detached(self.queue.detach_nodes(current, back))) }
    }

    /// Move all elements of `other` before the cursor.
    pub fn splice(&mut self, other: Queue) {
        if let Some(detached) = other.into_detached() {
            let prev = self.prev_node();
            // SAFETY: `self.current.prev` and `self.current` are valid nodes in the queue,
            // and they are adjacent, so it is safe.
            unsafe { self.queue.attach_nodes(prev, self.current, detached) };
        }
    }
}

pub struct CursorIter<'a> {
    pub(crate) cursor: Cursor<'a>,
}

pub struct CursorBackIter<'a> {
    pub(crate) cursor: Cursor<'a>,
}

impl<'a> CursorIter<'a> {
    pub fn into_cursor(self) -> Cursor<'a> {
        self.cursor
    }
    pub fn rev(self) -> CursorBackIter<'a> {
        CursorBackIter {
            cursor: self.cursor,
        }
    }
    pub fn peek(&self) -> Option<&'a str> {
        self.cursor.current()
    }
}

impl<'a> CursorBackIter<'a> {
    pub fn into_cursor(self) -> Cursor<'a> {
        self.cursor
    }
    pub fn rev(self) -> CursorIter<'a> {
        CursorIter {
            cursor: self.cursor,
        }
    }
    pub fn peek(&self) -> Option<&'a str> {
        self.cursor.previous()
    }
}

impl<'a> From<CursorMut<'a>> for Cursor<'a> {
    fn from(cursor: CursorMut<'a>) -> Self {
        cursor.into_cursor()
    }
}
