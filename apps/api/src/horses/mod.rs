// Horse records: CRUD over the store plus the list and detail views that
// attach vaccination status to each horse.

pub mod display;
pub mod handlers;
pub mod search;
pub mod store;
