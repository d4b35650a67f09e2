//! Driver event queue and callback dispatch.
//!
//! Interrupt handling is split in two: the interrupt context (or a status
//! poll) translates hardware flags into [`Event`]s and pushes them onto a
//! fixed-capacity [`EventQueue`]; application code drains the queue from
//! task context, where registered [`EventHandler`]s run. Handlers are
//! plain function pointers and must not call back into transmit/receive
//! paths while a drain is in progress.
//!
//! When the queue is full, new events are dropped and counted rather than
//! overwriting queued ones.

// =============================================================================
// Event Types
// =============================================================================

/// Default capacity for the driver's event queue
pub const DEFAULT_EVENT_CAPACITY: usize = 8;

/// The four event categories a handler can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// One or more frames arrived
    Received,
    /// One or more frames finished transmitting
    Transmitted,
    /// An abnormal hardware condition was flagged
    Error,
    /// The link went up or down
    LinkChanged,
}

impl EventKind {
    /// Number of event kinds (size of the callback table)
    pub(crate) const COUNT: usize = 4;

    /// Callback table slot for this kind
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// A single driver event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Frames are ready to be read out of the RX ring
    Received {
        /// Complete frames waiting at the time the event fired
        frames: u32,
    },
    /// Frames completed transmission and their descriptors were reclaimed
    Transmitted {
        /// Frames reclaimed by this completion
        frames: u32,
    },
    /// Abnormal condition; carries the DMA status register snapshot
    Error {
        /// Raw DMASR value at the time of the error
        dma_status: u32,
    },
    /// Link state transition
    LinkChanged {
        /// Whether the link is now up
        up: bool,
    },
}

impl Event {
    /// The category this event belongs to
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::Received { .. } => EventKind::Received,
            Event::Transmitted { .. } => EventKind::Transmitted,
            Event::Error { .. } => EventKind::Error,
            Event::LinkChanged { .. } => EventKind::LinkChanged,
        }
    }
}

/// Handler invoked when a matching event is drained from the queue
///
/// A plain function pointer: handlers cannot capture state, which keeps
/// them callable from the single-threaded drain loop without aliasing
/// the driver. Use statics (e.g. atomics) for cross-handler state.
pub type EventHandler = fn(Event);

// =============================================================================
// Event Queue
// =============================================================================

/// Fixed-capacity FIFO of pending driver events
///
/// Push happens in interrupt (or poll) context, pop in task context; the
/// driver serializes both, so no internal locking is needed. Overflow
/// drops the newest event and increments a counter - queued events are
/// never overwritten.
#[derive(Debug)]
pub struct EventQueue<const N: usize> {
    slots: [Option<Event>; N],
    head: usize,
    len: usize,
    dropped: u32,
}

impl<const N: usize> EventQueue<N> {
    /// Create an empty queue
    #[must_use]
    pub const fn new() -> Self {
        const {
            assert!(N > 0, "event queue capacity must be non-zero");
        }
        Self {
            slots: [None; N],
            head: 0,
            len: 0,
            dropped: 0,
        }
    }

    /// Queue capacity
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of queued events
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when no events are queued
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when another push would drop
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Events dropped to overflow since the last [`Self::clear`]
    #[must_use]
    pub const fn dropped_count(&self) -> u32 {
        self.dropped
    }

    /// Append an event; returns `false` (and counts the drop) when full
    pub fn push(&mut self, event: Event) -> bool {
        if self.len == N {
            self.dropped = self.dropped.saturating_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("event queue full, dropping {:?}", event);
            return false;
        }

        let tail = (self.head + self.len) % N;
        self.slots[tail] = Some(event);
        self.len += 1;
        true
    }

    /// Remove and return the oldest event
    pub fn pop(&mut self) -> Option<Event> {
        if self.len == 0 {
            return None;
        }

        let event = self.slots[self.head].take();
        self.head = (self.head + 1) % N;
        self.len -= 1;
        event
    }

    /// Discard all queued events and reset the drop counter
    pub fn clear(&mut self) {
        self.slots = [None; N];
        self.head = 0;
        self.len = 0;
        self.dropped = 0;
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Callback Table
// =============================================================================

/// Per-kind handler registration
///
/// One optional handler per [`EventKind`]. Dispatch looks up the handler
/// for the event's kind and invokes it synchronously.
#[derive(Debug, Default)]
pub struct CallbackTable {
    handlers: [Option<EventHandler>; EventKind::COUNT],
}

impl CallbackTable {
    /// Create an empty table
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handlers: [None; EventKind::COUNT],
        }
    }

    /// Register (or replace) the handler for one event kind
    pub fn register(&mut self, kind: EventKind, handler: EventHandler) {
        self.handlers[kind.index()] = Some(handler);
    }

    /// Remove the handler for one event kind
    pub fn unregister(&mut self, kind: EventKind) {
        self.handlers[kind.index()] = None;
    }

    /// True when a handler is registered for this kind
    #[must_use]
    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.handlers[kind.index()].is_some()
    }

    /// Invoke the handler matching the event's kind
    ///
    /// Returns `true` when a handler ran.
    pub fn dispatch(&self, event: Event) -> bool {
        match self.handlers[event.kind().index()] {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn event_kind_indices_cover_table() {
        let kinds = [
            EventKind::Received,
            EventKind::Transmitted,
            EventKind::Error,
            EventKind::LinkChanged,
        ];

        for (expected, kind) in kinds.into_iter().enumerate() {
            assert_eq!(kind.index(), expected);
        }
        assert_eq!(kinds.len(), EventKind::COUNT);
    }

    #[test]
    fn event_kind_matches_variant() {
        assert_eq!(Event::Received { frames: 1 }.kind(), EventKind::Received);
        assert_eq!(
            Event::Transmitted { frames: 2 }.kind(),
            EventKind::Transmitted
        );
        assert_eq!(Event::Error { dma_status: 0 }.kind(), EventKind::Error);
        assert_eq!(Event::LinkChanged { up: true }.kind(), EventKind::LinkChanged);
    }

    #[test]
    fn queue_starts_empty() {
        let queue: EventQueue<4> = EventQueue::new();

        assert!(queue.is_empty());
        assert!(!queue.is_full());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 4);
        assert_eq!(queue.dropped_count(), 0);
    }

    #[test]
    fn queue_push_pop_fifo_order() {
        let mut queue: EventQueue<4> = EventQueue::new();

        assert!(queue.push(Event::Received { frames: 1 }));
        assert!(queue.push(Event::Transmitted { frames: 2 }));
        assert!(queue.push(Event::LinkChanged { up: true }));

        assert_eq!(queue.pop(), Some(Event::Received { frames: 1 }));
        assert_eq!(queue.pop(), Some(Event::Transmitted { frames: 2 }));
        assert_eq!(queue.pop(), Some(Event::LinkChanged { up: true }));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn queue_wraps_around() {
        let mut queue: EventQueue<2> = EventQueue::new();

        // Cycle through more events than the capacity to exercise wrap.
        for i in 0..5u32 {
            assert!(queue.push(Event::Received { frames: i }));
            assert_eq!(queue.pop(), Some(Event::Received { frames: i }));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_overflow_drops_newest() {
        let mut queue: EventQueue<2> = EventQueue::new();

        assert!(queue.push(Event::Received { frames: 1 }));
        assert!(queue.push(Event::Received { frames: 2 }));
        assert!(queue.is_full());

        // Full: the new event is rejected, queued ones survive.
        assert!(!queue.push(Event::Received { frames: 3 }));
        assert_eq!(queue.dropped_count(), 1);

        assert_eq!(queue.pop(), Some(Event::Received { frames: 1 }));
        assert_eq!(queue.pop(), Some(Event::Received { frames: 2 }));
    }

    #[test]
    fn queue_clear_resets_state() {
        let mut queue: EventQueue<2> = EventQueue::new();

        queue.push(Event::Received { frames: 1 });
        queue.push(Event::Received { frames: 2 });
        queue.push(Event::Received { frames: 3 });
        assert_eq!(queue.dropped_count(), 1);

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.dropped_count(), 0);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn callback_dispatch_invokes_matching_handler() {
        static RX_HITS: AtomicU32 = AtomicU32::new(0);

        fn on_rx(event: Event) {
            if let Event::Received { frames } = event {
                RX_HITS.fetch_add(frames, Ordering::Relaxed);
            }
        }

        let mut table = CallbackTable::new();
        table.register(EventKind::Received, on_rx);

        assert!(table.dispatch(Event::Received { frames: 3 }));
        assert_eq!(RX_HITS.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn callback_dispatch_without_handler_returns_false() {
        let table = CallbackTable::new();
        assert!(!table.dispatch(Event::Error { dma_status: 0x2000 }));
    }

    #[test]
    fn callback_dispatch_ignores_other_kinds() {
        static LINK_HITS: AtomicU32 = AtomicU32::new(0);

        fn on_link(_event: Event) {
            LINK_HITS.fetch_add(1, Ordering::Relaxed);
        }

        let mut table = CallbackTable::new();
        table.register(EventKind::LinkChanged, on_link);

        // An event of a different kind must not reach the link handler.
        assert!(!table.dispatch(Event::Transmitted { frames: 1 }));
        assert_eq!(LINK_HITS.load(Ordering::Relaxed), 0);

        assert!(table.dispatch(Event::LinkChanged { up: false }));
        assert_eq!(LINK_HITS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn callback_unregister_removes_handler() {
        fn on_tx(_event: Event) {}

        let mut table = CallbackTable::new();
        table.register(EventKind::Transmitted, on_tx);
        assert!(table.is_registered(EventKind::Transmitted));

        table.unregister(EventKind::Transmitted);
        assert!(!table.is_registered(EventKind::Transmitted));
        assert!(!table.dispatch(Event::Transmitted { frames: 1 }));
    }

    #[test]
    fn callback_register_replaces_existing() {
        static FIRST: AtomicU32 = AtomicU32::new(0);
        static SECOND: AtomicU32 = AtomicU32::new(0);

        fn first(_event: Event) {
            FIRST.fetch_add(1, Ordering::Relaxed);
        }
        fn second(_event: Event) {
            SECOND.fetch_add(1, Ordering::Relaxed);
        }

        let mut table = CallbackTable::new();
        table.register(EventKind::Error, first);
        table.register(EventKind::Error, second);

        table.dispatch(Event::Error { dma_status: 0 });

        assert_eq!(FIRST.load(Ordering::Relaxed), 0);
        assert_eq!(SECOND.load(Ordering::Relaxed), 1);
    }
}
