//! # zpl-printer
//!
//! ZPL label printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ZPL command building
//! - `^FH` field data escaping
//! - Network printing (raw TCP port 9100)
//!
//! Business logic (WHAT to print) stays in application code:
//! - Scale label layout and batch dispatch → scale-labels
//!
//! ## Example
//!
//! ```ignore
//! use zpl_printer::{NetworkPrinter, Printer, ZplBuilder};
//!
//! // Build ZPL content
//! let mut builder = ZplBuilder::new(320, 320);
//! builder.graphic_box(10, 10, 300, 300, 3);
//! builder.centered_text(60, 35, "Padaria");
//! builder.qr_code(110, 180, 2, "Model:X\nSN:123");
//! builder.print_quantity(2);
//!
//! // Send to network printer
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.print(builder.build().as_bytes()).await?;
//! ```

mod error;
mod escape;
mod printer;
mod zpl;

// Re-exports
pub use error::{PrintError, PrintResult};
pub use escape::{LINE_BREAK_ESCAPE, escape_line_breaks};
pub use printer::{DEFAULT_PORT, DEFAULT_TIMEOUT, NetworkPrinter, Printer, PrinterAddress};
pub use zpl::ZplBuilder;
