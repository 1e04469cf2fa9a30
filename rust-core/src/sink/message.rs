//! Inbound messages delivered to the producer between batches
//!
//! Frequency updates and packets may originate on any thread. They travel
//! through one bounded channel and are applied by the sink itself, so the
//! processing step never sees configuration change under it.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::warn;

use super::input::Pdu;
use crate::error::{SinkError, SinkResult};

/// Messages waiting before senders start seeing `MessageQueueFull`
pub const MESSAGE_CAPACITY: usize = 256;

/// Message kinds accepted on the sink's inbound port
#[derive(Debug, Clone, PartialEq)]
pub enum SinkMessage {
    /// Recenter the frequency axis
    SetFreq(f64),
    /// A packet of samples for the packet path
    Pdu(Pdu),
}

/// Cloneable sending side of the sink's message port
#[derive(Debug, Clone)]
pub struct SinkHandle {
    tx: Sender<SinkMessage>,
}

impl SinkHandle {
    /// Post a message without blocking
    pub fn send(&self, message: SinkMessage) -> SinkResult<()> {
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => {
                warn!("Sink message queue full, dropping message");
                SinkError::MessageQueueFull
            }
            TrySendError::Disconnected(_) => SinkError::SinkClosed,
        })
    }

    /// Ask the sink to recenter its frequency axis
    pub fn set_freq(&self, center: f64) -> SinkResult<()> {
        self.send(SinkMessage::SetFreq(center))
    }

    /// Hand a packet to the sink
    pub fn post_pdu(&self, pdu: impl Into<Pdu>) -> SinkResult<()> {
        self.send(SinkMessage::Pdu(pdu.into()))
    }
}

/// Create the message port
pub fn message_port() -> (SinkHandle, Receiver<SinkMessage>) {
    let (tx, rx) = bounded(MESSAGE_CAPACITY);
    (SinkHandle { tx }, rx)
}
