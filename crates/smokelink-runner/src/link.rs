//! Transports connecting the detector to a real or emulated base station.
//!
//! - [`ChannelTransport`]: the detector's end of a pair of tokio channels. The
//!   other end is a TCP listener task ([`spawn_tcp_bridge`]) or a test.
//! - [`SerialTransport`]: a serial port opened with `serialport`.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use serialport::SerialPort;
use smokelink_detector::Transport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of each direction of a channel pair, in chunks.
const CHANNEL_CAPACITY: usize = 256;

/// Serial read timeout; keeps `available` polling responsive.
const SERIAL_TIMEOUT: Duration = Duration::from_millis(10);

// ============================================================================
// Channels
// ============================================================================

/// Detector side of a channel pair.
///
/// Inbound chunks are buffered and handed out byte by byte. Outbound writes
/// are forwarded as chunks. When the peer cannot keep up, outbound data is
/// dropped and the detector's retransmission takes over.
#[derive(Debug)]
pub struct ChannelTransport {
    outbound: mpsc::Sender<Vec<u8>>,
    inbound: mpsc::Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

/// Peer side of a channel pair.
#[derive(Debug)]
pub struct ChannelPeer {
    /// Bytes for the detector to read.
    pub to_detector: mpsc::Sender<Vec<u8>>,
    /// Bytes the detector wrote.
    pub from_detector: mpsc::Receiver<Vec<u8>>,
}

impl ChannelTransport {
    /// Create a connected transport and peer.
    pub fn pair() -> (ChannelTransport, ChannelPeer) {
        let (to_detector, inbound) = mpsc::channel(CHANNEL_CAPACITY);
        let (outbound, from_detector) = mpsc::channel(CHANNEL_CAPACITY);
        (
            ChannelTransport {
                outbound,
                inbound,
                pending: VecDeque::new(),
            },
            ChannelPeer {
                to_detector,
                from_detector,
            },
        )
    }

    fn fill(&mut self) {
        while let Ok(chunk) = self.inbound.try_recv() {
            self.pending.extend(chunk);
        }
    }

    fn send(&mut self, chunk: Vec<u8>) -> io::Result<()> {
        match self.outbound.try_send(chunk) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(chunk)) => {
                warn!("link: outbound channel full, dropping {} bytes", chunk.len());
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "link peer has shut down",
            )),
        }
    }
}

impl Transport for ChannelTransport {
    fn available(&mut self) -> io::Result<bool> {
        if self.pending.is_empty() {
            self.fill();
        }
        Ok(!self.pending.is_empty())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        self.pending
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.send(vec![byte])
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.send(bytes.to_vec())
    }
}

// ============================================================================
// TCP bridge
// ============================================================================

/// Bind `addr` and bridge accepted connections to a [`ChannelTransport`].
/// Returns the transport and the bound address.
///
/// One client is served at a time. Bytes written while no client is connected
/// are delivered to the next one, up to the channel capacity.
pub async fn spawn_tcp_bridge(addr: &str) -> io::Result<(ChannelTransport, SocketAddr)> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!("link: listening on {}", local_addr);

    let (transport, peer) = ChannelTransport::pair();
    tokio::spawn(async move {
        if let Err(e) = run_listener(listener, peer).await {
            warn!("link: listener stopped: {}", e);
        }
    });
    Ok((transport, local_addr))
}

async fn run_listener(listener: TcpListener, mut peer: ChannelPeer) -> io::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        info!("link: base station connected from {}", peer_addr);

        let result = handle_connection(stream, &mut peer).await;
        match result {
            Ok(()) => info!("link: {} disconnected", peer_addr),
            Err(e) => warn!("link: connection error from {}: {}", peer_addr, e),
        }
        if peer.to_detector.is_closed() {
            return Ok(());
        }
    }
}

async fn handle_connection(mut stream: TcpStream, peer: &mut ChannelPeer) -> io::Result<()> {
    let (mut reader, mut writer) = stream.split();
    let mut read_buf = [0u8; 256];

    loop {
        tokio::select! {
            result = reader.read(&mut read_buf) => {
                let n = result?;
                if n == 0 {
                    return Ok(());
                }
                debug!("link: {} bytes from base station", n);
                if peer.to_detector.send(read_buf[..n].to_vec()).await.is_err() {
                    return Ok(());
                }
            }
            chunk = peer.from_detector.recv() => {
                let Some(chunk) = chunk else {
                    return Ok(());
                };
                writer.write_all(&chunk).await?;
                writer.flush().await?;
            }
        }
    }
}

// ============================================================================
// Serial port
// ============================================================================

/// A serial port, 8N1 without flow control.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .finish()
    }
}

impl SerialTransport {
    /// Open `path` at `baud_rate`.
    pub fn open(path: &str, baud_rate: u32) -> serialport::Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(SERIAL_TIMEOUT)
            .open()?;
        info!("link: opened {} at {} baud", path, baud_rate);
        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    fn available(&mut self) -> io::Result<bool> {
        Ok(self.port.bytes_to_read()? > 0)
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.write_all(&[byte])
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.port, bytes)?;
        self.port.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_pair_inbound() {
        let (mut transport, peer) = ChannelTransport::pair();
        assert!(!transport.available().unwrap());

        peer.to_detector.try_send(vec![1, 2]).unwrap();
        peer.to_detector.try_send(vec![3]).unwrap();
        let mut read = Vec::new();
        while transport.available().unwrap() {
            read.push(transport.read_byte().unwrap());
        }
        assert_eq!(read, vec![1, 2, 3]);
    }

    #[test]
    fn test_channel_pair_outbound() {
        let (mut transport, mut peer) = ChannelTransport::pair();
        transport.write_byte(0x06).unwrap();
        transport.write_all(&[0x00, 0x02]).unwrap();
        assert_eq!(peer.from_detector.try_recv().unwrap(), vec![0x06]);
        assert_eq!(peer.from_detector.try_recv().unwrap(), vec![0x00, 0x02]);
    }

    #[test]
    fn test_closed_peer_is_an_error() {
        let (mut transport, peer) = ChannelTransport::pair();
        drop(peer);
        let err = transport.write_byte(0x06).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_full_channel_drops() {
        let (mut transport, _peer) = ChannelTransport::pair();
        for _ in 0..CHANNEL_CAPACITY + 10 {
            transport.write_byte(0x15).unwrap();
        }
    }

    #[test]
    fn test_read_from_empty_would_block() {
        let (mut transport, _peer) = ChannelTransport::pair();
        let err = transport.read_byte().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }
}
