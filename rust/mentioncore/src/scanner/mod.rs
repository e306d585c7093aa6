pub mod syntax;
pub mod extract;
pub mod emission;

pub use syntax::*;
pub use extract::*;
pub use emission::*;
