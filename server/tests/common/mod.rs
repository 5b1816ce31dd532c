#![allow(dead_code)]

pub mod fixtures;
pub mod test_database;

#[allow(unused_imports)]
pub use fixtures::{Harness, SharedNames, SpyCache};
#[allow(unused_imports)]
pub use test_database::TestDatabaseGuard;

/// Skip the calling test when no Postgres is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        }
    };
}
