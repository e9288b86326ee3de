use std::path::PathBuf;
use std::time::Duration;

use zpl_printer::{PrintResult, PrinterAddress};

/// Label station configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | SCALE_DB_PATH | scale-labels.redb | database file |
/// | PRINTER_ADDR | 192.168.1.100 | default printer (port 9100 unless given) |
/// | PRINT_COPIES | 1 | copies per label |
/// | PRINTER_TIMEOUT_MS | 2000 | printer connect timeout |
/// | PRINT_CONCURRENCY | 1 | labels in flight at once |
/// | LOG_LEVEL | info | log filter when RUST_LOG is unset |
/// | LOG_DIR | - | daily rolling log files |
///
/// # Example
///
/// ```ignore
/// PRINTER_ADDR=10.0.3.20 PRINT_COPIES=2 scale-labels print --store "Loja Centro" --all
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// redb database file
    pub db_path: PathBuf,
    /// Default printer address
    pub printer_addr: String,
    /// Copies per label
    pub print_copies: u32,
    /// Printer connect timeout (milliseconds)
    pub printer_timeout_ms: u64,
    /// Maximum concurrent printer connections in a batch
    pub print_concurrency: usize,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// Log directory, stderr only when unset
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("SCALE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("scale-labels.redb")),
            printer_addr: std::env::var("PRINTER_ADDR")
                .unwrap_or_else(|_| "192.168.1.100".into()),
            print_copies: std::env::var("PRINT_COPIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&c| c > 0)
                .unwrap_or(1),
            printer_timeout_ms: std::env::var("PRINTER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            print_concurrency: std::env::var("PRINT_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&c| c > 0)
                .unwrap_or(1),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    pub fn printer_timeout(&self) -> Duration {
        Duration::from_millis(self.printer_timeout_ms)
    }

    /// Parsed default printer address
    pub fn printer_address(&self) -> PrintResult<PrinterAddress> {
        PrinterAddress::parse(&self.printer_addr)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
