pub mod context;
pub mod creature;
pub mod encounter;
pub mod hex;
pub mod weather;
