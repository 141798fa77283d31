mod receiver_store;

pub use receiver_store::*;
