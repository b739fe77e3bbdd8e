pub mod errors;
pub mod order;
pub mod ports;
pub mod rate_limit;
pub mod validation;
