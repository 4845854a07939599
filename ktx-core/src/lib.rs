//! Core types for monthly KTX station ridership data.
//!
//! This crate provides:
//! - `period`: calendar-month values normalized to the first day of the month
//! - `record`: the canonical `Record` row and the immutable `Table`
//! - `schema`: header mapping and validation of raw tables into `Table`s
//! - `criteria`: station + date interval selection used by the filter stage
//! - `error`: the `KtxError` taxonomy shared by every pipeline stage

pub mod criteria;
pub mod error;
pub mod period;
pub mod record;
pub mod schema;

pub use criteria::FilterCriteria;
pub use error::{ErrorStage, KtxError, Result};
pub use period::Period;
pub use record::{Record, Table};
pub use schema::{validate, Field, NegativeCountPolicy, RawTable, MAX_COUNT};
