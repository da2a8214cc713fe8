mod preferences;
mod schema;
mod session;

pub use schema::{Database, DatabaseError};
pub use session::StoredSession;
