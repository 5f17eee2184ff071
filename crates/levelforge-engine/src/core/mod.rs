pub use self::{cell::*, config::*, level::*};

pub(crate) mod cell;
pub(crate) mod config;
pub(crate) mod level;
