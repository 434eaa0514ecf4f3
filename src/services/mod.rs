pub mod catalog;
pub mod identity;
pub mod ledger;
pub mod session;
