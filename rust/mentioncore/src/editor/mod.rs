pub mod document;
pub mod session;
pub mod binding;

pub use document::*;
pub use session::*;
pub use binding::*;
