//! TCP transport with length-prefixed framing.
//!
//! Every message on the wire is a frame:
//!
//! ```text
//! +-------------------+--------------------+
//! | length (4 bytes)  |   payload          |
//! | u32 little-endian |   (length bytes)   |
//! +-------------------+--------------------+
//! ```
//!
//! The length does not include the prefix itself. Reads use short socket
//! timeouts so a pending receive can honour its deadline and cancel token;
//! partially read frames stay buffered between attempts.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;

use tracing::{debug, info};

use super::channel::{poll_until, Channel, ReceiveOptions};
use crate::error::ChannelError;

const PREFIX_LEN: usize = 4;

/// Default cap on a single frame's payload.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024;

/// A connected peer over TCP.
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: Vec<u8>,
    max_payload: usize,
}

impl TcpChannel {
    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream, max_payload: usize) -> Result<Self, ChannelError> {
        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        Ok(TcpChannel {
            stream,
            peer,
            buffer: Vec::new(),
            max_payload,
        })
    }

    /// Connect to a hosting peer.
    pub fn connect(addr: impl ToSocketAddrs, max_payload: usize) -> Result<Self, ChannelError> {
        let stream = TcpStream::connect(addr)?;
        let channel = Self::from_stream(stream, max_payload)?;
        info!(peer = %channel.peer, "connected to host");
        Ok(channel)
    }

    /// Wait for one peer to connect to `listener`.
    ///
    /// Honours the same deadline and cancel token as [`Channel::receive`].
    pub fn accept(
        listener: &TcpListener,
        max_payload: usize,
        options: &ReceiveOptions,
    ) -> Result<Self, ChannelError> {
        listener.set_nonblocking(true)?;
        let stream = poll_until(options, |wait| match listener.accept() {
            Ok((stream, _)) => Ok(Some(stream)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(wait);
                Ok(None)
            }
            Err(e) => Err(ChannelError::Io(e)),
        })?;
        let channel = Self::from_stream(stream, max_payload)?;
        info!(peer = %channel.peer, "peer joined");
        Ok(channel)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Split a complete frame off the front of the buffer, if one is there.
    fn take_frame(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        if self.buffer.len() < PREFIX_LEN {
            return Ok(None);
        }

        let mut prefix = [0u8; PREFIX_LEN];
        prefix.copy_from_slice(&self.buffer[..PREFIX_LEN]);
        let len = u32::from_le_bytes(prefix) as usize;
        if len > self.max_payload {
            return Err(ChannelError::PayloadTooLarge {
                size: len,
                max: self.max_payload,
            });
        }

        if self.buffer.len() < PREFIX_LEN + len {
            return Ok(None);
        }

        let payload = self.buffer[PREFIX_LEN..PREFIX_LEN + len].to_vec();
        self.buffer.drain(..PREFIX_LEN + len);
        Ok(Some(payload))
    }
}

impl Channel for TcpChannel {
    fn send(&mut self, payload: &[u8]) -> Result<(), ChannelError> {
        if payload.len() > self.max_payload {
            return Err(ChannelError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload,
            });
        }

        let len = payload.len() as u32;
        self.stream.write_all(&len.to_le_bytes())?;
        self.stream.write_all(payload)?;
        self.stream.flush()?;
        debug!(bytes = payload.len(), peer = %self.peer, "frame sent");
        Ok(())
    }

    fn receive(&mut self, options: &ReceiveOptions) -> Result<Vec<u8>, ChannelError> {
        let payload = poll_until(options, |wait| {
            if let Some(frame) = self.take_frame()? {
                return Ok(Some(frame));
            }

            self.stream.set_read_timeout(Some(wait))?;
            let mut chunk = [0u8; 4096];
            match self.stream.read(&mut chunk) {
                Ok(0) => Err(ChannelError::Closed),
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    self.take_frame()
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                    ) =>
                {
                    Ok(None)
                }
                Err(e) => Err(ChannelError::Io(e)),
            }
        })?;
        debug!(bytes = payload.len(), peer = %self.peer, "frame received");
        Ok(payload)
    }
}
