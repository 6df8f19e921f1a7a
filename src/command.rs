//! Actuator command values and the channel that carries them.
//!
//! The actuator expects a fixed-size datagram holding the same signed 16-bit
//! command in every slot, each slot in network byte order.

/// Number of command slots in one payload.
pub const COMMAND_SLOTS: usize = 4;

/// Size of an encoded payload in bytes.
pub const COMMAND_PAYLOAD_LEN: usize = COMMAND_SLOTS * core::mem::size_of::<i16>();

/// Signed actuator position command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandValue(pub i16);

impl CommandValue {
    /// Returns the raw command.
    pub const fn get(self) -> i16 {
        self.0
    }

    /// Applies one sweep increment.
    ///
    /// Returns `Err` with the rejected (widened) value when its magnitude
    /// exceeds `max_magnitude`; the current value is never exceeded past the
    /// limit.
    pub fn step(self, increment: i16, max_magnitude: u16) -> Result<Self, i32> {
        let next = i32::from(self.0) + i32::from(increment);
        if next.unsigned_abs() > u32::from(max_magnitude) {
            return Err(next);
        }
        i16::try_from(next).map(Self).map_err(|_| next)
    }
}

impl From<i16> for CommandValue {
    fn from(value: i16) -> Self {
        Self(value)
    }
}

/// Encoded actuator datagram: one command repeated across every slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandPayload {
    bytes: [u8; COMMAND_PAYLOAD_LEN],
}

impl CommandPayload {
    /// Fills every slot with `value` in network byte order.
    pub fn repeat(value: CommandValue) -> Self {
        let mut bytes = [0u8; COMMAND_PAYLOAD_LEN];
        for slot in bytes.chunks_exact_mut(core::mem::size_of::<i16>()) {
            slot.copy_from_slice(&value.get().to_be_bytes());
        }
        Self { bytes }
    }

    /// Returns the wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the command held in each slot.
    pub fn slots(&self) -> [i16; COMMAND_SLOTS] {
        let mut slots = [0i16; COMMAND_SLOTS];
        for (slot, raw) in slots.iter_mut().zip(self.bytes.chunks_exact(2)) {
            *slot = i16::from_be_bytes([raw[0], raw[1]]);
        }
        slots
    }
}

/// Fire-and-forget transport towards the actuator.
pub trait CommandChannel {
    /// Error type produced by the transport.
    type Error;

    /// Sends one payload, returning the number of bytes handed to the transport.
    fn send(&mut self, payload: &CommandPayload) -> core::result::Result<usize, Self::Error>;
}

#[cfg(feature = "std")]
pub use self::udp::UdpCommandChannel;

#[cfg(feature = "std")]
mod udp {
    use std::io;
    use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

    use super::{CommandChannel, CommandPayload};

    /// [`CommandChannel`] over a connected UDP socket.
    #[derive(Debug)]
    pub struct UdpCommandChannel {
        socket: UdpSocket,
        peer: SocketAddr,
    }

    impl UdpCommandChannel {
        /// Binds an ephemeral local port of the peer's address family and
        /// connects it to `host:port`.
        pub fn open(host: &str, port: u16) -> io::Result<Self> {
            let peer = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("no address for {host}:{port}"))
            })?;
            let local: SocketAddr = if peer.is_ipv4() {
                (Ipv4Addr::UNSPECIFIED, 0).into()
            } else {
                (Ipv6Addr::UNSPECIFIED, 0).into()
            };
            let socket = UdpSocket::bind(local)?;
            socket.connect(peer)?;
            Ok(Self { socket, peer })
        }

        /// Returns the actuator endpoint.
        pub fn peer(&self) -> SocketAddr {
            self.peer
        }
    }

    impl CommandChannel for UdpCommandChannel {
        type Error = io::Error;

        fn send(&mut self, payload: &CommandPayload) -> io::Result<usize> {
            let sent = self.socket.send(payload.as_bytes())?;
            if sent == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "command datagram not sent"));
            }
            Ok(sent)
        }
    }
}
