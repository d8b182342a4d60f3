pub mod connection;
pub mod provider;

pub use connection::*;
pub use provider::ConnectionProvider;
