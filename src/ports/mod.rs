//! Port traits through which the domain reaches the outside world.

pub mod config_port;
pub mod quote_port;
