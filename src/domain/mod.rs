pub mod entities;
pub mod error;
pub mod outcome;
pub mod types;
