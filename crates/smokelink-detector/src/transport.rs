//! Byte transport between the detector and the base station.

use std::collections::VecDeque;
use std::io;

/// A minimal byte stream. Framing and synchronization are the detector's job.
pub trait Transport {
    /// Whether at least one byte can be read without blocking.
    fn available(&mut self) -> io::Result<bool>;

    /// Read one byte. Only called after [`Transport::available`] returned true.
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Write one byte.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Write a complete byte sequence.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        bytes.iter().try_for_each(|&b| self.write_byte(b))
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn available(&mut self) -> io::Result<bool> {
        (**self).available()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_all(bytes)
    }
}

/// In-memory transport: an inbound queue the test (or loopback peer) fills,
/// and a log of everything the detector wrote.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the detector to read.
    pub fn push_inbound(&mut self, data: &[u8]) {
        self.inbound.extend(data);
    }

    /// Number of queued bytes the detector has not read yet.
    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }

    /// Everything written since the last [`MemoryTransport::take_outbound`].
    pub fn outbound(&self) -> &[u8] {
        &self.outbound
    }

    /// Drain the written bytes.
    pub fn take_outbound(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

impl Transport for MemoryTransport {
    fn available(&mut self) -> io::Result<bool> {
        Ok(!self.inbound.is_empty())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        self.inbound
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::WouldBlock, "no inbound data"))
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.outbound.push(byte);
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.outbound.extend_from_slice(bytes);
        Ok(())
    }
}
