pub mod complaints;
pub mod connection;
pub mod staff;
pub mod status_updates;

pub use connection::Database;
