//! Scale label printing types

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Rejected label input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("Scale number must be positive")]
    InvalidScaleNumber,

    #[error("Department name is empty")]
    EmptyDepartment,

    #[error("Copy count must be at least 1")]
    InvalidCopyCount,
}

/// One label to print, built from a persisted scale
///
/// Immutable once built; the constructor rejects a zero scale number, a
/// blank department or a zero copy count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRecord {
    scale_number: u32,
    department_name: String,
    copy_count: u32,
    payload: Option<String>,
}

impl LabelRecord {
    pub fn new(
        scale_number: u32,
        department_name: impl Into<String>,
        copy_count: u32,
        payload: Option<String>,
    ) -> Result<Self, LabelError> {
        let department_name = department_name.into();

        if scale_number == 0 {
            return Err(LabelError::InvalidScaleNumber);
        }
        if department_name.trim().is_empty() {
            return Err(LabelError::EmptyDepartment);
        }
        if copy_count == 0 {
            return Err(LabelError::InvalidCopyCount);
        }

        Ok(Self {
            scale_number,
            department_name,
            copy_count,
            payload: payload.filter(|p| !p.is_empty()),
        })
    }

    pub fn scale_number(&self) -> u32 {
        self.scale_number
    }

    pub fn department_name(&self) -> &str {
        &self.department_name
    }

    pub fn copy_count(&self) -> u32 {
        self.copy_count
    }

    /// Free-text payload, `None` when absent or empty
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// QR code content before escaping
    ///
    /// Falls back to `Scale:<number>|Dept:<department>` when there is no payload.
    pub fn qr_payload(&self) -> Cow<'_, str> {
        match &self.payload {
            Some(payload) => Cow::Borrowed(payload),
            None => Cow::Owned(format!(
                "Scale:{}|Dept:{}",
                self.scale_number, self.department_name
            )),
        }
    }
}

/// ZPL document for exactly one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    pub(crate) fn new(zpl: String) -> Self {
        Self(zpl)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// UTF-8 bytes as sent on the wire
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a single send
///
/// `success` only means the transport accepted every byte; ZPL printers
/// never acknowledge a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReport {
    pub success: bool,
    pub message: String,
}

impl SendReport {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "OK".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Outcome for one record of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintOutcome {
    /// Position of the record in the batch input
    pub index: usize,
    pub scale_number: u32,
    pub department_name: String,
    pub printer: String,
    pub success: bool,
    pub message: String,
}

/// Aggregated batch result
///
/// `succeeded + failed == total == outcomes.len()`, and `outcomes[i]`
/// belongs to the i-th input record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Cancelled between items; the skipped records are counted as failed
    pub cancelled: bool,
    pub outcomes: Vec<PrintOutcome>,
}

impl BatchResult {
    pub fn from_outcomes(outcomes: Vec<PrintOutcome>, cancelled: bool) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            cancelled,
            outcomes,
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }

    pub fn failures(&self) -> impl Iterator<Item = &PrintOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

/// Live batch progress, published once per completed item in input order
#[derive(Debug, Clone)]
pub struct PrintProgress {
    pub completed: usize,
    pub total: usize,
    pub outcome: PrintOutcome,
}
