//! Application layer: the per-request pipeline.
//!
//! [`coordinator::RequestCoordinator`] drives a decoded payload through the
//! [`normalizer`], the document renderer and the [`dispatcher`], in that order.

pub mod coordinator;
pub mod dispatcher;
pub mod normalizer;
