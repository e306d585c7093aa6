pub mod items;
pub mod trigger;
pub mod popover;

pub use items::*;
pub use trigger::*;
pub use popover::*;
