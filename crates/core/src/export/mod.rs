//! Export of approved claims to the ledger and the bank.
//!
//! # Modules
//!
//! - `booking` - Booking CSV rows and rendering
//! - `payment` - SEPA pain.001.001.03 rendering
//! - `documents` - Artifact paths, run ids and retrieval
//! - `pipeline` - The run: select, render, upload, commit

pub mod booking;
pub mod documents;
pub mod error;
pub mod payment;
pub mod pipeline;

pub use booking::{BookingRow, comma_decimal, render_booking_file};
pub use documents::{Document, DocumentKind, ExportRunSummary};
pub use error::{ExportError, FailedArtifact};
pub use payment::{PaymentBatch, Transfer};
pub use pipeline::{ExportPipeline, ExportRun};
