pub mod horse;
pub mod vaccination;
