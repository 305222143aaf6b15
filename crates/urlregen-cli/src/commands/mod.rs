//! Command implementations for the urlregen CLI, one submodule per command.

mod regenerate;
mod stores;

pub use regenerate::execute as regenerate;
pub use stores::execute as list_stores;
