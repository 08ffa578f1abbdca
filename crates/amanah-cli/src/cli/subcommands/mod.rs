mod account;
mod entry;
mod migrate;

pub use account::AccountCommands;
pub use entry::EntryCommands;
pub use migrate::MigrateCommands;
