pub mod aggregate;
pub mod guards;
pub mod machine;
pub mod monitor;
