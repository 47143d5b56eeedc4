//! Layout engines and interaction state behind an interactive chart gallery:
//! rows become trees or graphs, layouts turn those into geometry, and the
//! viewport and interaction state keep pointer input in sync with it.

pub mod charts;
pub mod config;
pub mod data;
pub mod force;
pub mod hierarchy;
pub mod interaction;
pub mod layout;
pub mod scale;
pub mod util;
pub mod viewport;
