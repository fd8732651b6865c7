#![warn(missing_docs)]

//! Hit recording boundary for detgeo.
//!
//! The geometry engine only *wires* sensitive markers onto logical volumes;
//! the actual stepping is done by the external transport framework. This
//! crate defines the contract at that boundary: [`Hit`] records, per-event
//! [`HitsCollection`]s created at begin-event and drained at end-event, the
//! [`SensitiveMarker`] fed by the stepping kernel, the [`DetectorRegistry`]
//! the registrar registers into, and the [`EventTable`] tabular sink.

pub mod error;
pub mod hit;
pub mod sensitive;
pub mod table;

pub use error::{HitsError, Result};
pub use hit::{Hit, HitsCollection};
pub use sensitive::{DetectorRegistry, SensitiveMarker, StepRecord};
pub use table::EventTable;
