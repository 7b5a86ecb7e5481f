//! In-memory transport over tokio channels.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Connector, Transport, TransportError};

/// One end of an in-process link.
pub struct LoopbackTransport {
    tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    /// Held by a room opener until the room is joined or abandoned.
    lease: Option<RoomLease>,
}

impl LoopbackTransport {
    /// Two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Some(a_tx),
                rx: b_rx,
                lease: None,
            },
            Self {
                tx: Some(b_tx),
                rx: a_rx,
                lease: None,
            },
        )
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    async fn close(&mut self) {
        tracing::debug!(target: "battle::transport", "closing loopback link");
        self.tx = None;
        self.rx.close();
        self.lease = None;
    }
}

struct Waiting {
    ticket: u64,
    end: LoopbackTransport,
}

#[derive(Default)]
struct Rooms {
    next_ticket: u64,
    waiting: HashMap<String, Waiting>,
}

/// Evicts an unjoined room once its opener is dropped or closed.
struct RoomLease {
    room: String,
    ticket: u64,
    rooms: Weak<Mutex<Rooms>>,
}

impl Drop for RoomLease {
    fn drop(&mut self) {
        let Some(rooms) = self.rooms.upgrade() else {
            return;
        };
        let Ok(mut rooms) = rooms.lock() else {
            return;
        };
        // a joined room, or a newer room under the same name, is left alone
        if rooms.waiting.get(&self.room).is_some_and(|w| w.ticket == self.ticket) {
            rooms.waiting.remove(&self.room);
            tracing::debug!(target: "battle::transport", room = %self.room, "evicted unjoined loopback room");
        }
    }
}

/// Room registry pairing the first two callers of each room.
///
/// The first `connect` for a room parks the far end; the second picks it up.
/// A third caller opens a fresh room under the same name. A room whose opener
/// goes away before anyone joins is evicted.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    rooms: Arc<Mutex<Rooms>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rooms opened but not joined yet.
    pub fn waiting_rooms(&self) -> usize {
        self.rooms.lock().map(|rooms| rooms.waiting.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Connector for LoopbackHub {
    async fn connect(&self, room: &str) -> Result<Box<dyn Transport>, TransportError> {
        let mut rooms = self
            .rooms
            .lock()
            .map_err(|_| TransportError::Unavailable("loopback registry poisoned".into()))?;
        if let Some(waiting) = rooms.waiting.remove(room) {
            tracing::debug!(target: "battle::transport", room, "joined loopback room");
            return Ok(Box::new(waiting.end));
        }
        let ticket = rooms.next_ticket;
        rooms.next_ticket += 1;
        let (mut mine, theirs) = LoopbackTransport::pair();
        mine.lease = Some(RoomLease {
            room: room.to_owned(),
            ticket,
            rooms: Arc::downgrade(&self.rooms),
        });
        rooms.waiting.insert(room.to_owned(), Waiting { ticket, end: theirs });
        tracing::debug!(target: "battle::transport", room, "opened loopback room");
        Ok(Box::new(mine))
    }
}
