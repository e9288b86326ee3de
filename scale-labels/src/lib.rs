//! Scale label station
//!
//! Keeps the scales of each retail store and prints their identification
//! labels on ZPL printers.
//!
//! # Modules
//!
//! ```text
//! scale-labels/src/
//! ├── core/          # configuration
//! ├── printing/      # label renderer, print dispatcher, batch results
//! ├── models.rs      # store / scale entities
//! ├── storage.rs     # redb storage
//! └── utils/         # logging
//! ```

pub mod core;
pub mod models;
pub mod printing;
pub mod storage;
pub mod utils;

// Re-export public types
pub use crate::core::Config;
pub use models::{DEFAULT_DEPARTMENTS, Scale, Store};
pub use printing::{
    BatchResult, LabelError, LabelRecord, PrintDispatcher, PrintOutcome, PrintProgress,
    RenderedDocument, ScaleLabelRenderer, SendReport,
};
pub use storage::{ScaleStorage, StorageError, StorageResult, StorageStats};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Printer layer used in public signatures
pub use zpl_printer::{PrintError, PrinterAddress};
