pub mod automaton;
pub mod config;
pub mod display;
pub mod error;
pub mod init;
pub mod page;
pub mod query;
pub mod response;
pub mod state;

pub use error::{Error, Result};
pub use wolfram_ca_automaton::{Rule, Wrap};
