pub mod control_mode;
pub mod pidf;
