//! Presentation-neutral client state.
//!
//! A front end keeps a [`GraphState`] and advances it only through
//! [`reduce`]; [`CachedNodeService`] does this automatically after each
//! successful call.

mod cache;
mod reducer;

pub use cache::CachedNodeService;
pub use reducer::{reduce, Edge, GraphEvent, GraphState};
