//! Pass timing

mod pass;

pub use pass::PassClock;
