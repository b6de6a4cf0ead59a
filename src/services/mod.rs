//! Use-case layer consumed by front ends.
//!
//! [`NodeService`] is the small interface a presentation layer calls; the
//! [`CachedNodeService`](crate::state::CachedNodeService) decorates it with
//! client-side state.

mod node;

pub use node::NodeService;

#[cfg(test)]
pub(crate) use node::fake;
