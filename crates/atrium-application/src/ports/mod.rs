//! Application Ports
//!
//! Contracts the application layer offers to the outside world.
//!
//! | Port | Description |
//! |------|-------------|
//! | [`WritePathHooks`] | Called by the CRUD layer after backing-store writes |

pub mod hooks;

pub use hooks::WritePathHooks;
