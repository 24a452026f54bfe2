pub mod complaint;
pub mod dates;
pub mod metrics;
pub mod status;
pub mod transition;
