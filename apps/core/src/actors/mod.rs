pub mod learning;
pub mod messages;
pub mod traits;
