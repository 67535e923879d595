pub mod connector;
pub mod csv_connector;
pub mod simulator;

pub use connector::*;
pub use csv_connector::*;
pub use simulator::*;
