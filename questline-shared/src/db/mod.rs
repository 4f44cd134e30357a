//! Database connectivity: pool construction and embedded migrations.

pub mod migrations;
pub mod pool;
