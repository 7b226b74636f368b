//! Type definitions

pub mod edge;
pub mod forecast;
pub mod job;
pub mod node;
pub mod schedule;
pub mod vehicle;

pub use edge::*;
pub use forecast::*;
pub use job::*;
pub use node::*;
pub use schedule::*;
pub use vehicle::*;
