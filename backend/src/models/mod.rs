pub mod analytics;
pub mod event;
pub mod macros;
pub mod time;

pub use analytics::*;
pub use event::*;
