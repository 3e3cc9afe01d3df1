pub mod market;
pub mod property;
pub mod search;
pub mod zip;
