//! Printer adapters for sending ZPL data
//!
//! Supports network printers on the raw TCP port (9100).

use crate::error::{PrintError, PrintResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

/// Raw printing port used by label printers
pub const DEFAULT_PORT: u16 = 9100;

/// Connection timeout: a printer on the local network answers at once or not at all
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ZPL data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Host and port of a network printer
///
/// Hosts are IP addresses or DNS names; the port defaults to 9100.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrinterAddress {
    host: String,
    port: u16,
}

impl PrinterAddress {
    /// Create an address from a host and a port
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let host = host.trim();
        if port == 0 {
            return Err(PrintError::InvalidConfig(format!(
                "Invalid port for {}: 0",
                host
            )));
        }
        if host.parse::<IpAddr>().is_err() && !is_valid_hostname(host) {
            return Err(PrintError::InvalidConfig(format!(
                "Invalid printer host: {:?}",
                host
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Parse `host`, `host:port`, `ip`, `ip:port` or `[ipv6]:port`
    pub fn parse(s: &str) -> PrintResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PrintError::InvalidConfig(
                "Printer address is empty".to_string(),
            ));
        }

        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Self::new(&addr.ip().to_string(), addr.port());
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Self::new(&ip.to_string(), DEFAULT_PORT);
        }

        match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    PrintError::InvalidConfig(format!("Invalid address: {}", s))
                })?;
                Self::new(host, port)
            }
            None => Self::new(s, DEFAULT_PORT),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for PrinterAddress {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PrinterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// RFC 1123 style host name: dot separated labels of letters, digits and '-'
fn is_valid_hostname(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Network printer (TCP port 9100)
///
/// Label printers accept a raw ZPL stream on port 9100 and send nothing
/// back, so a completed write is the only confirmation available.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: PrinterAddress,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        Ok(Self::with_address(PrinterAddress::new(host, port)?))
    }

    /// Create from an address string (e.g., "192.168.1.100:9100")
    ///
    /// Port 9100 is used if the address has none.
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        Ok(Self::with_address(PrinterAddress::parse(addr)?))
    }

    /// Create from an already validated address
    pub fn with_address(addr: PrinterAddress) -> Self {
        Self {
            addr,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> &PrinterAddress {
        &self.addr
    }

    async fn connect(&self, timeout: Duration) -> PrintResult<TcpStream> {
        tokio::time::timeout(
            timeout,
            TcpStream::connect((self.addr.host(), self.addr.port())),
        )
        .await
        .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
        .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.addr, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        debug!("Connecting to printer");

        let mut stream = self.connect(self.timeout).await?;

        debug!("Connected, sending {} bytes", data.len());

        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;

        stream.flush().await?;

        // Bytes are already with the transport, a failed FIN is not a failed job
        if let Err(e) = stream.shutdown().await {
            warn!(error = %e, "Printer connection shutdown failed");
        }

        info!("Print job sent successfully");
        Ok(())
    }

    #[instrument(fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match self.connect(check_timeout).await {
            Ok(_) => {
                info!("Printer online");
                true
            }
            Err(PrintError::Timeout(_)) => {
                warn!("Printer check timeout");
                false
            }
            Err(e) => {
                warn!(error = %e, "Printer offline");
                false
            }
        }
    }
}
