//! Chart-facing side of the ridership pipeline.
//!
//! - `descriptor`: the declarative `ViewDescriptor` handed to a chart layer
//! - `assembler`: pairs each aggregation result with its descriptor
//! - `renderer`: the `ChartRenderer` contract and the JSON file renderer
//! - `controls`: station and date-range selection state

pub mod assembler;
pub mod controls;
pub mod descriptor;
pub mod renderer;

pub use assembler::{assemble, assemble_all};
pub use controls::{Controls, DEFAULT_PREFERRED_STATIONS};
pub use descriptor::{AxisLabels, ChartType, ViewDescriptor, ViewKind};
pub use renderer::{ChartRenderer, JsonRenderer, MemoryRenderer};
