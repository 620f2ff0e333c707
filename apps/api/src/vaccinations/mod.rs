// Vaccination log: one row per administered dose. Rows are only ever created,
// date-corrected or deleted; status is derived from them on read.

pub mod handlers;
pub mod store;
