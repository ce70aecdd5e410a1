//! Peer synchronization: channels, snapshot encoding, and the synchronizer
//! that pushes and pulls whole-game snapshots between two instances.

mod channel;
mod snapshot;
pub mod tcp;

pub use channel::{CancelToken, Channel, MemoryChannel, ReceiveOptions};
pub use snapshot::{GameState, JsonCodec, SnapshotCodec, SnapshotPolicy};
pub use tcp::TcpChannel;

use tracing::{debug, warn};

use crate::error::SyncError;

/// Where a networked instance is in the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Blocked on the peer's next snapshot.
    WaitingForPeer,
    /// The local side may move.
    LocalTurn,
    /// A local move is being pushed to the peer.
    SendingState,
    /// The match is decided; nothing more is exchanged.
    GameOver,
}

/// Pushes and pulls [`GameState`] snapshots over a [`Channel`].
pub struct Synchronizer {
    channel: Box<dyn Channel>,
    codec: Box<dyn SnapshotCodec>,
    policy: SnapshotPolicy,
    receive: ReceiveOptions,
}

impl Synchronizer {
    /// JSON snapshots, trusting policy, unbounded receive.
    pub fn new(channel: impl Channel + 'static) -> Self {
        Synchronizer {
            channel: Box::new(channel),
            codec: Box::new(JsonCodec),
            policy: SnapshotPolicy::default(),
            receive: ReceiveOptions::default(),
        }
    }

    pub fn with_codec(mut self, codec: impl SnapshotCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn with_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_receive_options(mut self, options: ReceiveOptions) -> Self {
        self.receive = options;
        self
    }

    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    /// Token that aborts a pending [`pull`](Self::pull) from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.receive.cancel.clone()
    }

    /// Encode `state` and send it to the peer.
    pub fn push(&mut self, state: &GameState) -> Result<(), SyncError> {
        let payload = self.codec.encode(state)?;
        self.channel.send(&payload)?;
        debug!(
            move_counter = state.move_counter,
            winner = ?state.winner,
            "pushed snapshot"
        );
        Ok(())
    }

    /// Wait for the peer's next snapshot and decode it.
    pub fn pull(&mut self) -> Result<GameState, SyncError> {
        let payload = self.channel.receive(&self.receive)?;
        let state = self.codec.decode(&payload)?;

        if self.policy == SnapshotPolicy::Strict {
            if let Err(err) = state.validate() {
                warn!(error = %err, "rejected snapshot from peer");
                return Err(err.into());
            }
        }

        debug!(
            move_counter = state.move_counter,
            winner = ?state.winner,
            "pulled snapshot"
        );
        Ok(state)
    }
}
