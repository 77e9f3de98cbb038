pub mod interest;
pub mod occupation;
