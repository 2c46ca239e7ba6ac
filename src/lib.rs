//! Desktop Starter: a first-run setup wizard.
//!
//! The wizard walks through a fixed sequence of steps, lets the user browse a
//! catalog of packages with their live install status, and keeps a
//! launch-at-startup preference across restarts.

pub mod error;
pub mod event;
pub mod packages;
pub mod starter;
pub mod system;
pub mod ui;
pub mod vim;
