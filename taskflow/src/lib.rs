//! `TaskFlow` — task and project tracker core.
//!
//! Holds the canonical project and task lists for a signed-in user, applies
//! changes through a persistence [`gateway`], and derives filtered views and
//! statistics from the loaded state.

pub mod avatar;
pub mod config;
pub mod demo;
pub mod directory;
pub mod gateway;
pub mod session;
pub mod state;
pub mod view;
