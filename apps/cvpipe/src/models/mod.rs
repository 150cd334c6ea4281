pub mod candidate;
pub mod email;
pub mod role;
