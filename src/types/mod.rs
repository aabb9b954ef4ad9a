//! Core data types
//!
//! - `Event`: the immutable value stored by the index

mod event;

pub use event::Event;
