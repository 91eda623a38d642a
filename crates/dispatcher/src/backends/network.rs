//! NetworkWriter - one UDP datagram per frame

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use contracts::{ContractError, DataFrame, NetworkBackendConfig, WireFormat, WriterBackend};
use serde::Serialize;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, warn};

/// Configuration for NetworkWriter
#[derive(Debug, Clone)]
pub struct NetworkWriterConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: WireFormat,
    /// Origin stamped on every datagram
    pub origin: Option<String>,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkWriterConfig {
    /// Resolve the `[network]` config section
    pub async fn resolve(config: &NetworkBackendConfig) -> std::io::Result<Self> {
        let addr = tokio::net::lookup_host(config.addr.as_str())
            .await?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("address '{}' did not resolve", config.addr),
                )
            })?;

        Ok(Self {
            addr,
            format: config.format,
            origin: config.origin.clone(),
            max_packet_size: config.max_packet_size,
        })
    }
}

/// Wire envelope
#[derive(Serialize)]
struct Envelope<'a> {
    origin: Option<&'a str>,
    frame: &'a DataFrame,
}

/// Backend that sends frames over UDP
pub struct NetworkWriter {
    name: String,
    config: NetworkWriterConfig,
    socket: Mutex<Option<Arc<UdpSocket>>>,
}

impl NetworkWriter {
    /// Create a new NetworkWriter connected to `config.addr`
    #[instrument(name = "network_writer_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: NetworkWriterConfig) -> std::io::Result<Self> {
        let name = name.into();
        let local: SocketAddr = if config.addr.is_ipv6() {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(config.addr).await?;

        debug!(backend = %name, target = %config.addr, "NetworkWriter connected");

        Ok(Self {
            name,
            config,
            socket: Mutex::new(Some(Arc::new(socket))),
        })
    }

    /// Create from the `[network]` config section
    pub async fn from_config(
        name: impl Into<String>,
        config: &NetworkBackendConfig,
    ) -> std::io::Result<Self> {
        let config = NetworkWriterConfig::resolve(config).await?;
        Self::new(name, config).await
    }

    /// Target address
    pub fn addr(&self) -> SocketAddr {
        self.config.addr
    }

    fn encode(&self, frame: &DataFrame) -> Result<Vec<u8>, ContractError> {
        let envelope = Envelope {
            origin: self.config.origin.as_deref(),
            frame,
        };
        let data = match self.config.format {
            WireFormat::Json => serde_json::to_vec(&envelope).map_err(|e| format!("json error: {e}")),
            WireFormat::Bincode => {
                bincode::serialize(&envelope).map_err(|e| format!("bincode error: {e}"))
            }
        }
        .map_err(|e| ContractError::backend_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                backend = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Packet too large, dropping frame"
            );
            return Err(ContractError::backend_write(
                &self.name,
                format!(
                    "packet of {} bytes exceeds max_packet_size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }
        Ok(data)
    }

    fn socket(&self) -> Result<Arc<UdpSocket>, ContractError> {
        self.socket
            .lock()
            .map_err(|_| ContractError::backend_write(&self.name, "socket lock poisoned"))?
            .clone()
            .ok_or_else(|| ContractError::backend_write(&self.name, "socket not connected"))
    }
}

impl WriterBackend for NetworkWriter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_writer_write",
        skip(self, frame),
        fields(backend = %self.name, timestamp = frame.timestamp)
    )]
    async fn write_frame(&self, frame: &DataFrame) -> Result<(), ContractError> {
        let data = self.encode(frame)?;
        let socket = self.socket()?;
        let sent = socket
            .send(&data)
            .await
            .map_err(|e| ContractError::backend_connection(&self.name, e.to_string()))?;
        debug!(backend = %self.name, bytes = sent, "Sent");
        Ok(())
    }

    #[instrument(name = "network_writer_shutdown", skip(self))]
    async fn shutdown(&self) -> Result<(), ContractError> {
        let socket = self
            .socket
            .lock()
            .map_err(|_| ContractError::backend_shutdown(&self.name, "socket lock poisoned"))?
            .take();
        if socket.is_none() {
            return Err(ContractError::backend_shutdown(&self.name, "already shut down"));
        }
        debug!(backend = %self.name, "NetworkWriter closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::FramePayload;

    async fn receiver() -> (UdpSocket, SocketAddr) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, addr)
    }

    fn config(addr: SocketAddr, max_packet_size: usize) -> NetworkWriterConfig {
        NetworkWriterConfig {
            addr,
            format: WireFormat::Json,
            origin: Some("ABCDEF".to_string()),
            max_packet_size,
        }
    }

    #[tokio::test]
    async fn test_network_config_resolve() {
        let section = NetworkBackendConfig {
            addr: "127.0.0.1:9999".to_string(),
            format: WireFormat::Bincode,
            origin: None,
            max_packet_size: 65000,
        };
        let config = NetworkWriterConfig::resolve(&section).await.unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, WireFormat::Bincode);
    }

    #[tokio::test]
    async fn test_network_writer_sends_envelope() {
        let (rx, addr) = receiver().await;
        let writer = NetworkWriter::new("network", config(addr, 65000)).await.unwrap();

        let frame = DataFrame::new(42, FramePayload::Number(7)).with_tag("host", "a");
        writer.write_frame(&frame).await.unwrap();

        let mut buf = vec![0u8; 65536];
        let len = rx.recv(&mut buf).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(value["origin"], "ABCDEF");
        assert_eq!(value["frame"]["timestamp"], 42);
    }

    #[tokio::test]
    async fn test_network_writer_rejects_oversize() {
        let (_rx, addr) = receiver().await;
        let writer = NetworkWriter::new("network", config(addr, 16)).await.unwrap();

        let frame = DataFrame::new(1, FramePayload::Text("x".repeat(64)));
        let err = writer.write_frame(&frame).await.unwrap_err();
        assert!(matches!(err, ContractError::BackendWrite { .. }));
    }

    #[tokio::test]
    async fn test_network_writer_shutdown() {
        let (_rx, addr) = receiver().await;
        let writer = NetworkWriter::new("network", config(addr, 65000)).await.unwrap();
        writer.shutdown().await.unwrap();

        let frame = DataFrame::new(1, FramePayload::Empty);
        assert!(writer.write_frame(&frame).await.is_err());
        assert!(writer.shutdown().await.is_err());
    }
}
