pub mod header;
pub mod writer;

pub use header::{Header, Measure, Section, FILE_ID, HEADER_SIZE};
pub use writer::{emit, measure, ArchiveInputs, WordOrders};
