// lib.rs
// Library modules for the bingocast live caller

pub mod defs;
pub mod logging;
pub mod config;
pub mod state;
pub mod protocol;
pub mod hub;
pub mod server;
pub mod role;
pub mod reconcile;
pub mod announcer;
pub mod announcement;
pub mod terminal;
pub mod client;
