pub mod backup;
pub mod core;
pub mod students;
