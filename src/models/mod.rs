pub mod job;
pub mod lookup;
