//! Post-processing: registered passes and the per-frame ping-pong chain.
//!
//! The scene is rendered into target `A`. Enabled passes then run in
//! registration order, each sampling the previous pass's output, and the last
//! one draws to the window. Executing the plan is up to
//! [`crate::drawer::Drawer::do_postprocess`].

mod chain;
mod pass;

pub use chain::{ChainOutput, ChainStep, PingPong, plan_chain};
pub use pass::{PassId, PassList, PostProcessPass};
