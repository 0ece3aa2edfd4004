//! Route handlers.

pub mod catalog;
pub mod info;
pub mod intake;
