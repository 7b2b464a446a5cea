//! Cat table subsystem
//!
//! A single CSV file holds every cat. This module owns:
//!
//! - the row codec (`codec`): header, row encoding and strict decoding
//! - the record store (`store`): id allocation and create/list/get/replace/delete
//!
//! # Invariants
//!
//! - Ids are unique and assigned in strictly increasing order
//! - Ids are never reused, not even after a delete or a failed append
//! - The file always holds exactly one header row followed by data rows
//! - Corrupt rows are reported, never repaired

pub mod codec;
mod errors;
mod record;
mod store;

pub use codec::{RawRow, HEADER};
pub use errors::{TableError, TableErrorCode, TableResult};
pub use record::{CatFields, CatRecord};
pub use store::RecordStore;
