//! API request handlers.

pub mod agents;
pub mod ask;
pub mod health;
pub mod history;
pub mod registry;

pub use agents::*;
pub use ask::*;
pub use health::*;
pub use history::*;
pub use registry::*;
