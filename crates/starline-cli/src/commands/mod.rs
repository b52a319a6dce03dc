//! Command implementations for starline-cli

pub mod command;
pub mod devices;
pub mod login;

pub use command::{arm, exec};
pub use devices::devices;
pub use login::{authenticate, login};
