//! Remote event dispatcher
//!
//! Protocol callbacks run on the display connection's dispatch context,
//! but the outbound channel belongs to whichever context bound it. Every
//! event is turned into an `InputMessage` at call time and pushed onto a
//! single ordered queue; the `DeliveryPump` owned by the binding context
//! drains that queue into the sender.
//!
//! Events emitted before `channel_established` are dropped unless
//! `DispatchConfig::buffer_before_bind` is set, in which case they wait in
//! the queue (at most `DispatchConfig::max_buffered` of them) and are
//! flushed in order on the first drain.

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::sync::mpsc as std_mpsc;
use std::sync::Mutex;
use std::thread::{self, ThreadId};
use thiserror::Error;
use tokio::sync::mpsc;

use super::{EventConverter, InputEvent};
use crate::config::DispatchConfig;

/// Message as handed to the outbound channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Position in the queue, starting at 0 for the first accepted event
    pub sequence: u64,
    pub event: InputEvent,
}

/// Outbound channel failure
#[derive(Debug, Error)]
pub enum SendError {
    #[error("channel disconnected")]
    Disconnected,
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound channel endpoint
///
/// Implemented by the cross-process transport. Exactly one `send` per
/// emitted event.
pub trait MessageSender {
    fn send(&mut self, message: InputMessage) -> Result<(), SendError>;
}

/// In-process endpoint backed by a std channel
pub struct ChannelSender(pub std_mpsc::Sender<InputMessage>);

impl MessageSender for ChannelSender {
    fn send(&mut self, message: InputMessage) -> Result<(), SendError> {
        self.0.send(message).map_err(|_| SendError::Disconnected)
    }
}

struct DispatchState {
    tx: mpsc::UnboundedSender<InputMessage>,
    /// Handed to the pump on binding
    rx: Option<mpsc::UnboundedReceiver<InputMessage>>,
    bound: bool,
    next_sequence: u64,
    /// Events queued while unbound
    buffered: usize,
}

/// Gateway from the callback context to the outbound channel
pub struct RemoteEventDispatcher {
    state: Mutex<DispatchState>,
    buffer_before_bind: bool,
    max_buffered: usize,
}

impl RemoteEventDispatcher {
    pub fn new(config: &DispatchConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Mutex::new(DispatchState {
                tx,
                rx: Some(rx),
                bound: false,
                next_sequence: 0,
                buffered: 0,
            }),
            buffer_before_bind: config.buffer_before_bind,
            max_buffered: config.max_buffered,
        }
    }

    /// Bind the outbound channel
    ///
    /// The calling context becomes the owner of the returned pump and is the
    /// only place messages reach `sender`. Returns `None` if a channel was
    /// already bound.
    pub fn channel_established<S: MessageSender>(&self, sender: S) -> Option<DeliveryPump<S>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let rx = match state.rx.take() {
            Some(rx) => rx,
            None => {
                warn!("Channel already established, ignoring second binding");
                return None;
            }
        };
        state.bound = true;
        info!("Event channel established");
        Some(DeliveryPump {
            rx,
            sender,
            owner: thread::current().id(),
            delivered: 0,
        })
    }

    pub fn is_bound(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).bound
    }
}

impl EventConverter for RemoteEventDispatcher {
    fn dispatch(&self, event: InputEvent) {
        // Sequence assignment and enqueue happen under one lock so queue
        // order always matches sequence order.
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.bound {
            if !self.buffer_before_bind {
                debug!("Dropping {} event: channel not established", event.name());
                return;
            }
            if state.buffered >= self.max_buffered {
                warn!(
                    "Dropping {} event: {} events already waiting for the channel",
                    event.name(),
                    state.buffered
                );
                return;
            }
            state.buffered += 1;
        }

        let message = InputMessage {
            sequence: state.next_sequence,
            event,
        };
        state.next_sequence += 1;
        trace!("Queue #{} {}", message.sequence, message.event.name());

        if let Err(e) = state.tx.send(message) {
            warn!("Delivery pump gone, dropping {} event", e.0.event.name());
        }
    }
}

/// Drains queued messages into the bound sender
///
/// Lives on the context that bound the channel. Messages are delivered in
/// queue order; a message that fails to send is logged and not retried.
pub struct DeliveryPump<S> {
    rx: mpsc::UnboundedReceiver<InputMessage>,
    sender: S,
    owner: ThreadId,
    delivered: u64,
}

impl<S: MessageSender> DeliveryPump<S> {
    /// Deliver everything currently queued (non-blocking)
    ///
    /// Returns the number of messages handed to the sender.
    pub fn drain(&mut self) -> usize {
        debug_assert_eq!(
            thread::current().id(),
            self.owner,
            "delivery pump drained outside its owning context"
        );
        let mut count = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.deliver(message);
            count += 1;
        }
        count
    }

    /// Deliver until every dispatcher handle is gone, then give the sender back
    pub async fn run(mut self) -> S {
        while let Some(message) = self.rx.recv().await {
            self.deliver(message);
        }
        debug!("Event queue closed after {} messages", self.delivered);
        self.sender
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub fn sender_mut(&mut self) -> &mut S {
        &mut self.sender
    }

    fn deliver(&mut self, message: InputMessage) {
        let sequence = message.sequence;
        let name = message.event.name();
        match self.sender.send(message) {
            Ok(()) => {
                self.delivered += 1;
                trace!("Sent #{} {}", sequence, name);
            }
            Err(e) => warn!("Failed to send #{} {}: {}", sequence, name, e),
        }
    }
}

impl<S: MessageSender + Send + 'static> DeliveryPump<S> {
    /// Move delivery onto a dedicated thread
    ///
    /// The thread becomes the owning context. It exits once the dispatcher
    /// is dropped and returns the sender through the join handle.
    pub fn spawn(self, name: &str) -> std::io::Result<thread::JoinHandle<S>> {
        thread::Builder::new().name(name.into()).spawn(move || {
            let mut pump = self;
            pump.owner = thread::current().id();

            match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(pump.run()),
                Err(e) => {
                    warn!("Failed to create tokio runtime, delivering synchronously: {}", e);
                    while let Some(message) = pump.rx.blocking_recv() {
                        pump.deliver(message);
                    }
                    pump.sender
                }
            }
        })
    }
}
