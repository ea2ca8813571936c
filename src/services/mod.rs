pub mod accounts;
pub mod errors;
pub mod posts;
