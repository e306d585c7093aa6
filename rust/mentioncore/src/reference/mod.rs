pub mod records;
pub mod index;
pub mod store;

pub use records::*;
pub use index::*;
pub use store::*;
