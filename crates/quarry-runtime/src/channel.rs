//! Coordinator end of an agent's duplex channel.
//!
//! Each agent gets one connected stream-socket pair. The agent end becomes
//! the child's stdin and stdout, this end is registered with the tokio
//! reactor so the dispatcher can wait on readiness across all agents at
//! once.
//!
//! Disconnects are not errors at this layer: a peer that went away shows
//! up as [`Inbound::Closed`] or [`Delivery::Closed`] and the dispatcher
//! decides what it means for the unit.

use quarry_core::protocol::{MoveRequest, WorldView, MOVE_REQUEST_LEN};
use std::io;
use std::os::unix::net::UnixStream as StdUnixStream;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

/// What a non-blocking poll of an agent's channel found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Nothing to read yet.
    Pending,
    /// One complete move request.
    Request(MoveRequest),
    /// The agent closed its end, possibly mid-message.
    Closed,
}

/// Whether a world view reached the agent's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Closed,
}

/// One agent's coordinator-side stream.
#[derive(Debug)]
pub struct AgentChannel {
    stream: UnixStream,
}

impl AgentChannel {
    /// Create a connected pair: the coordinator channel and the blocking
    /// agent end.
    ///
    /// Must be called from within a tokio runtime.
    pub fn pair() -> io::Result<(Self, StdUnixStream)> {
        let (ours, theirs) = StdUnixStream::pair()?;
        Ok((Self::from_std(ours)?, theirs))
    }

    /// Register an already connected std stream with the reactor.
    pub fn from_std(stream: StdUnixStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self {
            stream: UnixStream::from_std(stream)?,
        })
    }

    /// Resolve once the agent end has written something or hung up.
    pub async fn readable(&self) -> io::Result<()> {
        self.stream.readable().await
    }

    /// Send a world view, blocking until the whole message is written.
    pub async fn send(&mut self, view: &WorldView) -> io::Result<Delivery> {
        match self.stream.write_all(&view.encode()).await {
            Ok(()) => Ok(Delivery::Delivered),
            Err(e) if is_disconnect(&e) => Ok(Delivery::Closed),
            Err(e) => Err(e),
        }
    }

    /// Check for a pending move request without waiting.
    ///
    /// Once the first byte has arrived the rest of the message is awaited,
    /// so a request is never left half-read between polls.
    pub async fn poll_request(&mut self) -> io::Result<Inbound> {
        let mut buf = [0u8; MOVE_REQUEST_LEN];
        let first = loop {
            match self.stream.try_read(&mut buf) {
                Ok(0) => return Ok(Inbound::Closed),
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(Inbound::Pending),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_disconnect(&e) => return Ok(Inbound::Closed),
                Err(e) => return Err(e),
            }
        };

        if first < MOVE_REQUEST_LEN {
            match self.stream.read_exact(&mut buf[first..]).await {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof || is_disconnect(&e) => {
                    return Ok(Inbound::Closed)
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Inbound::Request(MoveRequest::decode(&buf)))
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
    )
}

/// Slot in the dispatcher's channel table, one per roster entry.
#[derive(Debug, Default)]
pub enum ChannelSlot {
    Active(AgentChannel),
    #[default]
    Disabled,
}

impl ChannelSlot {
    pub fn is_active(&self) -> bool {
        matches!(self, ChannelSlot::Active(_))
    }

    pub fn channel(&self) -> Option<&AgentChannel> {
        match self {
            ChannelSlot::Active(channel) => Some(channel),
            ChannelSlot::Disabled => None,
        }
    }

    pub fn channel_mut(&mut self) -> Option<&mut AgentChannel> {
        match self {
            ChannelSlot::Active(channel) => Some(channel),
            ChannelSlot::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::types::Coordinate;
    use std::io::{Read, Write};

    #[tokio::test]
    async fn poll_is_pending_until_a_request_arrives() {
        let (mut channel, mut agent) = AgentChannel::pair().unwrap();
        assert_eq!(channel.poll_request().await.unwrap(), Inbound::Pending);

        let request = MoveRequest::new(Coordinate::new(4, -2));
        request.write_to(&mut agent).unwrap();
        channel.readable().await.unwrap();
        assert_eq!(
            channel.poll_request().await.unwrap(),
            Inbound::Request(request)
        );
        assert_eq!(channel.poll_request().await.unwrap(), Inbound::Pending);
    }

    #[tokio::test]
    async fn split_request_is_reassembled() {
        let (mut channel, mut agent) = AgentChannel::pair().unwrap();
        let bytes = MoveRequest::new(Coordinate::new(1, 2)).encode();

        agent.write_all(&bytes[..3]).unwrap();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            agent.write_all(&bytes[3..]).unwrap();
            agent
        });

        channel.readable().await.unwrap();
        assert_eq!(
            channel.poll_request().await.unwrap(),
            Inbound::Request(MoveRequest::new(Coordinate::new(1, 2)))
        );
        writer.join().unwrap();
    }

    #[tokio::test]
    async fn hangup_reads_as_closed() {
        let (mut channel, agent) = AgentChannel::pair().unwrap();
        drop(agent);
        channel.readable().await.unwrap();
        assert_eq!(channel.poll_request().await.unwrap(), Inbound::Closed);
    }

    #[tokio::test]
    async fn hangup_mid_message_reads_as_closed() {
        let (mut channel, mut agent) = AgentChannel::pair().unwrap();
        agent.write_all(&[1, 0, 0]).unwrap();
        drop(agent);
        channel.readable().await.unwrap();
        assert_eq!(channel.poll_request().await.unwrap(), Inbound::Closed);
    }

    #[tokio::test]
    async fn send_delivers_whole_view_then_detects_hangup() {
        let (mut channel, mut agent) = AgentChannel::pair().unwrap();
        let view = WorldView::new(Coordinate::new(0, 0), Coordinate::new(2, 2), &[]);

        assert_eq!(channel.send(&view).await.unwrap(), Delivery::Delivered);
        let mut got = [0u8; 52];
        agent.read_exact(&mut got).unwrap();
        assert_eq!(WorldView::decode(&got).unwrap(), view);

        drop(agent);
        assert_eq!(channel.send(&view).await.unwrap(), Delivery::Closed);
    }
}
