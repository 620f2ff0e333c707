// Vaccination schedule: due dates, per-track status, list buckets and the dashboard feed.
// Everything here is pure and recomputed on every read; nothing derived is stored.

pub mod dashboard;
pub mod due;
pub mod grouping;
pub mod handlers;
pub mod tracks;
