pub mod account;
pub mod audit;
pub mod balance;
pub mod dispatch;
pub mod entry;
pub mod import;
pub mod migrate;
pub mod post;
pub mod schema;
pub mod shared;
pub mod statement;
pub mod trial_balance;
