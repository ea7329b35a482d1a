//! Blame data types.
//!
//! - `commit`: CommitRecord, one per distinct hash in a file's blame
//! - `blame`: LineRecord, BlameResult, ShaBlame and range slicing
//! - `range`: Position, Range in host editor coordinates

pub mod blame;
pub mod commit;
pub mod range;

pub use blame::*;
pub use commit::*;
pub use range::*;
