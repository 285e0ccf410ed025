pub use stats::*;
pub use user::*;
pub use video::*;

mod stats;
mod user;
mod video;

pub type Timestamp = surrealdb::sql::Datetime;

pub fn now() -> Timestamp {
    chrono::Utc::now().into()
}
