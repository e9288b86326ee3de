//! Scale label renderer
//!
//! Renders LabelRecord data into ZPL for 320x320 dot label printers.

use zpl_printer::ZplBuilder;

use super::types::{LabelRecord, RenderedDocument};

/// Label width in dots
pub const LABEL_WIDTH: u32 = 320;
/// Label length in dots
pub const LABEL_HEIGHT: u32 = 320;

/// Scale label renderer
///
/// Department on top, scale number in the middle, QR code at the bottom,
/// all inside a bordered square.
#[derive(Debug, Clone)]
pub struct ScaleLabelRenderer {
    department_caption: String,
    scale_caption: String,
}

impl ScaleLabelRenderer {
    pub fn new() -> Self {
        Self::with_captions("Department:", "Scale:")
    }

    /// Renderer with custom field captions (e.g. localized)
    pub fn with_captions(department: impl Into<String>, scale: impl Into<String>) -> Self {
        Self {
            department_caption: department.into(),
            scale_caption: scale.into(),
        }
    }

    /// Render a record with its own copy count
    pub fn render(&self, record: &LabelRecord) -> RenderedDocument {
        self.render_with_copies(record, record.copy_count())
    }

    /// Render a record with an explicit copy count (at least 1)
    pub fn render_with_copies(&self, record: &LabelRecord, copies: u32) -> RenderedDocument {
        let mut b = ZplBuilder::new(LABEL_WIDTH, LABEL_HEIGHT);
        b.graphic_box(10, 10, 300, 300, 3);

        self.render_department(&mut b, record);
        self.render_scale(&mut b, record);

        b.blank();
        b.comment("--- QR CODE ---");
        b.qr_code(110, 180, 2, &record.qr_payload());

        b.blank();
        b.print_quantity(copies.max(1));

        RenderedDocument::new(b.build())
    }

    fn render_department(&self, b: &mut ZplBuilder, record: &LabelRecord) {
        b.blank();
        b.comment("--- DEPARTMENT ---");
        b.centered_text(30, 25, &self.department_caption);
        b.centered_text(60, 35, record.department_name());
    }

    fn render_scale(&self, b: &mut ZplBuilder, record: &LabelRecord) {
        b.blank();
        b.comment("--- SCALE ---");
        b.centered_text(100, 25, &self.scale_caption);
        b.centered_text(125, 60, &record.scale_number().to_string());
    }
}

impl Default for ScaleLabelRenderer {
    fn default() -> Self {
        Self::new()
    }
}
