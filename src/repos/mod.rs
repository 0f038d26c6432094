pub mod error;
pub mod pg_user_store;
pub mod user_store;

pub use error::StoreError;
pub use pg_user_store::PgUserStore;
pub use user_store::{RoleRef, UserRecord, UserStore, UserUpdate};
