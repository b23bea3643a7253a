#![forbid(unsafe_code)]

pub mod roster;
pub mod validate;
