/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded sqlx migrations for the `users` table
///
/// Queries themselves live on the models (see `models::user`).

pub mod migrations;
pub mod pool;
