mod network;
mod registry;
mod sign;

pub use network::*;
pub use registry::*;
pub use sign::*;

#[cfg(test)]
mod registry_test;
