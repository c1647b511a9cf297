pub mod conversion;
pub mod document;
pub mod records;

pub use conversion::*;
pub use document::*;
pub use records::*;
