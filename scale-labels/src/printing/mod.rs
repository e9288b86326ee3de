//! Scale Label Printing Module
//!
//! - Rendering: one ZPL label per scale record
//! - Dispatch: raw TCP delivery with per-item accounting across a batch

pub mod dispatcher;
pub mod renderer;
pub mod types;

pub use dispatcher::{CANCELLED_MESSAGE, PrintDispatcher};
pub use renderer::{LABEL_HEIGHT, LABEL_WIDTH, ScaleLabelRenderer};
pub use types::*;
