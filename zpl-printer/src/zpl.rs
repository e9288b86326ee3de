//! ZPL command builder
//!
//! Provides a fluent API for building ZPL label documents.

use crate::escape::escape_line_breaks;

/// ZPL command builder
///
/// Builds one `^XA ... ^XZ` label format, one command group per line.
/// The label is declared as UTF-8 (`^CI28`) so text fields may carry
/// accented department names.
pub struct ZplBuilder {
    buf: String,
    width: u32,
}

impl ZplBuilder {
    /// Create a new builder for a label of `width` x `height` dots
    pub fn new(width: u32, height: u32) -> Self {
        let mut buf = String::with_capacity(512);
        // Start format, UTF-8 encoding, print width, label length
        buf.push_str("^XA\n^CI28\n");
        buf.push_str(&format!("^PW{}\n^LL{}\n", width, height));
        Self { buf, width }
    }

    /// Get the configured label width in dots
    pub fn width(&self) -> u32 {
        self.width
    }

    // === Layout ===

    /// Write an empty line (ignored by the printer)
    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Write a `^FX` comment line
    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(&format!("^FX {}\n", text));
        self
    }

    /// Draw a rectangle outline at (x, y)
    pub fn graphic_box(&mut self, x: u32, y: u32, w: u32, h: u32, thickness: u32) -> &mut Self {
        // ^GB width,height,thickness
        self.buf.push_str(&format!(
            "^FO{},{}^GB{},{},{}^FS\n",
            x, y, w, h, thickness
        ));
        self
    }

    // === Text ===

    /// Single-line text field centered across the full label width
    ///
    /// Uses the scalable font 0 with equal height and width.
    pub fn centered_text(&mut self, y: u32, font_size: u32, text: &str) -> &mut Self {
        // ^FB width,lines,spacing,justification,indent
        self.buf.push_str(&format!(
            "^FO0,{}^FB{},1,0,C,0^A0N,{},{}^FD{}^FS\n",
            y, self.width, font_size, font_size, text
        ));
        self
    }

    // === QR Code ===

    /// QR code (model 2) at (x, y)
    ///
    /// Magnification: 1-10. Line breaks in `data` are hex escaped through
    /// `^FH`, everything else is embedded as-is with `QA,` (error
    /// correction Q, automatic input mode).
    pub fn qr_code(&mut self, x: u32, y: u32, magnification: u8, data: &str) -> &mut Self {
        let magnification = magnification.clamp(1, 10);
        self.buf.push_str(&format!(
            "^FO{},{}^BQ,2,{},M^FH^FDQA,{}^FS\n",
            x,
            y,
            magnification,
            escape_line_breaks(data)
        ));
        self
    }

    // === Job Control ===

    /// Number of copies the printer firmware prints of this format
    pub fn print_quantity(&mut self, copies: u32) -> &mut Self {
        self.buf.push_str(&format!("^PQ{}\n", copies.max(1)));
        self
    }

    // === Build ===

    /// Close the format (`^XZ`) and return the document text
    pub fn build(mut self) -> String {
        self.buf.push_str("^XZ");
        self.buf
    }
}

impl Default for ZplBuilder {
    fn default() -> Self {
        Self::new(320, 320)
    }
}
