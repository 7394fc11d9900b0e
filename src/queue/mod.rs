use std::alloc::{self, Layout};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::{trace, warn};

use crate::error::{QueueError, Result};
use crate::queue::cursor::{Cursor, CursorMut};
use crate::queue::element::{Element, Node};
use crate::Iter;

pub mod cursor;
pub mod element;
pub mod iterator;

mod algorithms;

/// The `Queue` is a deque of owned strings, built on an intrusive circular
/// doubly-linked list closed by a sentinel ("ghost") node.
///
/// Every element is a heap node whose first field is its link pair, so a
/// link pointer is converted to its element by a cast. The sentinel is a bare
/// link pair and carries no payload.
///
/// Insertion and removal at either end take *O*(1) time. The length is not
/// cached, so [`Queue::size`] walks the cycle in *O*(*n*) time.
///
/// # Naming Conventions
///
/// - `front..=back`: a closed range of nodes, both inclusive;
/// - `start..end`: a half-open range of nodes, left inclusive and right
///   exclusive (probably the ghost node).
pub struct Queue {
    ghost: NonNull<Link>,
    _marker: PhantomData<Box<Node>>,
}

/// A link pair in the cycle.
///
/// For every linked node `n`: `n.next.prev == n` and `n.prev.next == n`.
pub(crate) struct Link {
    pub(crate) next: NonNull<Link>,
    pub(crate) prev: NonNull<Link>,
}

/// Nodes fragment detached from a queue, used in splitting, splicing and
/// bulk deletion.
///
/// When detached from a queue, reading of `front.prev` and `back.next`
/// is invalid.
pub(crate) struct DetachedNodes {
    pub(crate) front: NonNull<Link>,
    pub(crate) back: NonNull<Link>,
    _marker: PhantomData<Box<Node>>,
}

impl Link {
    /// A link pair pointing nowhere, only used as a temporary chain anchor.
    pub(crate) fn dangling() -> Self {
        Self {
            next: NonNull::dangling(),
            prev: NonNull::dangling(),
        }
    }

    fn try_new_ghost() -> Result<NonNull<Link>> {
        let layout = Layout::new::<Link>();
        // SAFETY: `Link` is not zero-sized.
        let raw = unsafe { alloc::alloc(layout) }.cast::<Link>();
        let ghost = NonNull::new(raw).ok_or(QueueError::AllocationFailure)?;
        // SAFETY: `ghost` is valid for writes, and an empty cycle is the ghost
        // node linked to itself.
        unsafe {
            ghost.as_ptr().write(Link {
                next: ghost,
                prev: ghost,
            })
        };
        Ok(ghost)
    }
}

/// Links `prev -> next` in both directions.
///
/// # Safety
///
/// Both pointers must refer to live nodes.
pub(crate) unsafe fn connect(mut prev: NonNull<Link>, mut next: NonNull<Link>) {
    prev.as_mut().next = next;
    next.as_mut().prev = prev;
}

// private methods
impl Queue {
    pub(crate) fn ghost_node(&self) -> NonNull<Link> {
        self.ghost
    }
    pub(crate) fn front_node(&self) -> NonNull<Link> {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first element
        // in the queue).
        unsafe { self.ghost.as_ref().next }
    }
    pub(crate) fn back_node(&self) -> NonNull<Link> {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last element
        // in the queue).
        unsafe { self.ghost.as_ref().prev }
    }

    /// Detach a single node `node` from the queue, and return it as an owned
    /// [`Element`].
    ///
    /// It is unsafe because it does not check whether `node` belongs to the queue,
    /// or whether it is the ghost node.
    pub(crate) unsafe fn detach_node(&mut self, node: NonNull<Link>) -> Element {
        connect(node.as_ref().prev, node.as_ref().next);
        Element::from_detached(node)
    }

    /// Attach a single detached node `node` to the queue, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the queue, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    pub(crate) unsafe fn attach_node(
        &mut self,
        prev: NonNull<Link>,
        next: NonNull<Link>,
        node: NonNull<Link>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, node);
        connect(node, next);
        #[cfg(debug_assertions)]
        {
            assert_adjacent(prev, node);
            assert_adjacent(node, next);
        }
    }

    /// Detach a range of nodes `front..=back` from the queue, and return the
    /// detached nodes.
    ///
    /// It is unsafe because it does not check whether `front..=back` is a valid range
    /// (i.e. `front` must **NOT** be at the right of `back`), or whether it belongs
    /// to the queue.
    pub(crate) unsafe fn detach_nodes(
        &mut self,
        front: NonNull<Link>,
        back: NonNull<Link>,
    ) -> DetachedNodes {
        connect(front.as_ref().prev, back.as_ref().next);
        DetachedNodes::new(front, back)
    }

    /// Attach a range of detached nodes to the queue, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the queue, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    pub(crate) unsafe fn attach_nodes(
        &mut self,
        prev: NonNull<Link>,
        next: NonNull<Link>,
        detached: DetachedNodes,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, detached.front);
        connect(detached.back, next);
        #[cfg(debug_assertions)]
        {
            assert_adjacent(prev, detached.front);
            assert_adjacent(detached.back, next);
        }
    }

    /// Detach all nodes from the queue, and return the detached nodes, or return
    /// `None` if the queue is empty.
    ///
    /// It is safe because `self.front_node()..=self.back_node()` is a valid range.
    pub(crate) fn detach_all_nodes(&mut self) -> Option<DetachedNodes> {
        if self.is_empty() {
            return None;
        }
        unsafe { Some(self.detach_nodes(self.front_node(), self.back_node())) }
    }

    /// Construct a queue from detached nodes.
    pub(crate) fn from_detached(detached: DetachedNodes) -> Self {
        let mut queue = Queue::new();
        // SAFETY: the ghost node of an empty queue is adjacent to itself.
        unsafe {
            queue.attach_nodes(queue.ghost_node(), queue.ghost_node(), detached);
        }
        queue
    }

    /// Like [`Queue::detach_all_nodes`], but consume the queue.
    pub(crate) fn into_detached(mut self) -> Option<DetachedNodes> {
        self.detach_all_nodes()
    }

    /// Asserts the whole cycle is well formed when the `check-invariants`
    /// feature is enabled.
    #[inline]
    pub(crate) fn check_invariants(&self) {
        #[cfg(feature = "check-invariants")]
        assert!(self.is_well_formed(), "queue links are corrupted");
    }
}

impl Queue {
    /// Create an empty `Queue`.
    ///
    /// Aborts through [`std::alloc::handle_alloc_error`] if the ghost node
    /// cannot be allocated; see [`Queue::try_new`] for the fallible version.
    ///
    /// # Examples
    /// ```
    /// use intrusive_queue::Queue;
    /// let queue = Queue::new();
    /// assert_eq!(queue.size(), 0);
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|_| alloc::handle_alloc_error(Layout::new::<Link>()))
    }

    /// Create an empty `Queue`, or return [`QueueError::AllocationFailure`]
    /// if the ghost node cannot be allocated. Nothing is left allocated on
    /// failure.
    ///
    /// # Examples
    /// ```
    /// use intrusive_queue::Queue;
    /// let queue = Queue::try_new().unwrap();
    /// assert!(queue.is_empty());
    /// ```
    pub fn try_new() -> Result<Self> {
        let ghost = Link::try_new_ghost().map_err(|err| {
            warn!("failed to allocate the ghost node");
            err
        })?;
        Ok(Self {
            ghost,
            _marker: PhantomData,
        })
    }

    /// Returns `true` if the `Queue` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_node() == self.ghost_node()
    }

    /// Returns the number of elements, counted by walking the cycle.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// assert_eq!(queue.size(), 0);
    ///
    /// queue.insert_tail("a").unwrap();
    /// queue.insert_head("b").unwrap();
    /// assert_eq!(queue.size(), 2);
    /// ```
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// Removes and releases all elements from the `Queue`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    pub fn clear(&mut self) {
        if let Some(detached) = self.detach_all_nodes() {
            let released = detached.release();
            trace!(released, "cleared queue");
        }
    }

    /// Provides the first string, or `None` if the queue is empty.
    #[inline]
    pub fn front(&self) -> Option<&str> {
        self.cursor_start().current()
    }

    /// Provides the last string, or `None` if the queue is empty.
    #[inline]
    pub fn back(&self) -> Option<&str> {
        self.cursor_end().previous()
    }

    /// Copies `text` into a new element and links it right after the ghost
    /// node.
    ///
    /// On [`QueueError::AllocationFailure`] the queue is unchanged and the
    /// partially built element has been released.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time, plus the copy of `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_head("world").unwrap();
    /// queue.insert_head("hello").unwrap();
    /// assert_eq!(queue.front(), Some("hello"));
    /// ```
    pub fn insert_head(&mut self, text: &str) -> Result<()> {
        self.cursor_start_mut().insert(text)
    }

    /// Copies `text` into a new element and links it right before the ghost
    /// node.
    ///
    /// On [`QueueError::AllocationFailure`] the queue is unchanged and the
    /// partially built element has been released.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("hello").unwrap();
    /// queue.insert_tail("world").unwrap();
    /// assert_eq!(queue.back(), Some("world"));
    /// ```
    pub fn insert_tail(&mut self, text: &str) -> Result<()> {
        self.cursor_end_mut().insert(text)
    }

    /// Like [`Queue::insert_head`], but aborts on allocation failure.
    pub fn push_front(&mut self, text: &str) {
        if self.insert_head(text).is_err() {
            alloc::handle_alloc_error(Layout::new::<Node>());
        }
    }

    /// Like [`Queue::insert_tail`], but aborts on allocation failure.
    pub fn push_back(&mut self, text: &str) {
        if self.insert_tail(text).is_err() {
            alloc::handle_alloc_error(Layout::new::<Node>());
        }
    }

    /// Detaches the first element and hands it over to the caller, or returns
    /// `None` if the queue is empty.
    ///
    /// If `buffer` is given, the string is copied into it as a NUL-terminated
    /// byte string, truncated to `buffer.len() - 1` bytes; see
    /// [`Element::copy_into`].
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("gerbil").unwrap();
    ///
    /// let mut buffer = [0xff_u8; 4];
    /// let element = queue.remove_head(Some(&mut buffer)).unwrap();
    /// assert_eq!(element.value(), "gerbil");
    /// assert_eq!(&buffer, b"ger\0");
    /// assert!(queue.remove_head(None).is_none());
    /// ```
    pub fn remove_head(&mut self, buffer: Option<&mut [u8]>) -> Option<Element> {
        let element = self.cursor_start_mut().remove()?;
        if let Some(buffer) = buffer {
            element.copy_into(buffer);
        }
        Some(element)
    }

    /// Detaches the last element and hands it over to the caller, or returns
    /// `None` if the queue is empty.
    ///
    /// `buffer` is filled as in [`Queue::remove_head`].
    pub fn remove_tail(&mut self, buffer: Option<&mut [u8]>) -> Option<Element> {
        let element = self.cursor_end_mut().backspace()?;
        if let Some(buffer) = buffer {
            element.copy_into(buffer);
        }
        Some(element)
    }

    /// Removes the first string and returns it, or `None` if the queue is
    /// empty.
    pub fn pop_front(&mut self) -> Option<String> {
        self.remove_head(None).map(Element::into_value)
    }

    /// Removes the last string and returns it, or `None` if the queue is
    /// empty.
    pub fn pop_back(&mut self) -> Option<String> {
        self.remove_tail(None).map(Element::into_value)
    }

    /// Moves all elements from `other` to the end of the queue, leaving
    /// `other` empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let mut first = Queue::from_iter(["a"]);
    /// let mut second = Queue::from_iter(["b", "c"]);
    ///
    /// first.append(&mut second);
    ///
    /// assert_eq!(first, Queue::from_iter(["a", "b", "c"]));
    /// assert!(second.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        if let Some(detached) = other.detach_all_nodes() {
            // `self.back_node()` and `self.ghost_node()` are valid
            // nodes in the queue and they are adjacent, so it is safe.
            unsafe { self.attach_nodes(self.back_node(), self.ghost_node(), detached) }
        }
    }

    /// Moves all elements from `other` to the front of the queue, leaving
    /// `other` empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    pub fn prepend(&mut self, other: &mut Self) {
        if let Some(detached) = other.detach_all_nodes() {
            // `self.ghost_node()` and `self.front_node()` are valid
            // nodes in the queue and they are adjacent, so it is safe.
            unsafe { self.attach_nodes(self.ghost_node(), self.front_node(), detached) }
        }
    }

    /// Provides a cursor at the first node.
    ///
    /// The cursor is pointing to the "ghost" node if the queue is empty.
    pub fn cursor_start(&self) -> Cursor<'_> {
        Cursor::new(self, self.front_node())
    }

    /// Provides a cursor at the ghost node.
    pub fn cursor_end(&self) -> Cursor<'_> {
        Cursor::new(self, self.ghost_node())
    }

    /// Provides a cursor with editing operations at the first node.
    ///
    /// The cursor is pointing to the "ghost" node if the queue is empty.
    pub fn cursor_start_mut(&mut self) -> CursorMut<'_> {
        let front = self.front_node();
        CursorMut::new(self, front)
    }

    /// Provides a cursor with editing operations at the ghost node.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_> {
        let ghost = self.ghost_node();
        CursorMut::new(self, ghost)
    }

    /// Provides a forward iterator over the strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrusive_queue::Queue;
    ///
    /// let queue = Queue::from_iter(["x", "y"]);
    /// let mut iter = queue.iter();
    /// assert_eq!(iter.next(), Some("x"));
    /// assert_eq!(iter.next(), Some("y"));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Returns `true` if walking `next` from the ghost node comes back to it
    /// with `n.next.prev == n` holding at every step.
    ///
    /// The walk cannot loop forever: as long as every step mirrors, the first
    /// node visited twice can only be the ghost node.
    pub fn is_well_formed(&self) -> bool {
        let ghost = self.ghost_node();
        let mut node = ghost;
        loop {
            // SAFETY: every node reachable from the ghost node is owned by
            // the queue and alive.
            let next = unsafe { node.as_ref().next };
            if unsafe { next.as_ref().prev } != node {
                return false;
            }
            node = next;
            if node == ghost {
                return true;
            }
        }
    }
}

impl Debug for Queue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl DetachedNodes {
    /// If is unsafe because it must be guaranteed that `front..=back` is
    /// a valid range.
    pub(crate) unsafe fn new(front: NonNull<Link>, back: NonNull<Link>) -> Self {
        Self {
            front,
            back,
            _marker: PhantomData,
        }
    }

    /// Releases every node of the range and returns how many there were.
    ///
    /// The successor is read before a node is freed, so the walk never
    /// touches released memory.
    pub(crate) fn release(self) -> usize {
        let mut released = 0;
        let mut node = self.front;
        loop {
            let is_back = node == self.back;
            // SAFETY: `node` is in `front..=back`, which is owned by `self`
            // and not yet released.
            let next = unsafe { node.as_ref().next };
            drop(unsafe { Element::from_detached(node) });
            released += 1;
            if is_back {
                return released;
            }
            node = next;
        }
    }
}

#[cfg(debug_assertions)]
fn assert_adjacent(prev: NonNull<Link>, next: NonNull<Link>) {
    unsafe {
        assert_eq!(prev.as_ref().next, next);
        assert_eq!(next.as_ref().prev, prev);
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the ghost node was allocated with the layout of `Link` by
        // the global allocator, and no element links to it any more.
        drop(unsafe { Box::from_raw(self.ghost.as_ptr()) });
    }
}

unsafe impl Send for Queue {}

unsafe impl Sync for Queue {}
