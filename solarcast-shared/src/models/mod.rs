/// Domain models
///
/// - `user`: user accounts, their update/read views, and PostgreSQL CRUD

pub mod user;
