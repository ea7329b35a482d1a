pub mod events;
pub mod parser;
pub mod source;
pub mod store;

pub use events::{HostEvent, watch_events};
pub use parser::parse_blame;
pub use source::{BlameSource, CapturedSource, FnSource};
pub use store::BlameStore;
