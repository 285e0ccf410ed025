use derive_new::new;

use crate::database::Database;

/// Shared handler state: just a cloneable database handle.
#[derive(Debug, Clone, new)]
pub struct App {
    pub database: Database,
}

pub fn create_app(database: Database) -> App {
    App::new(database)
}
