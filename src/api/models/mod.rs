pub mod posts;
pub mod users;

pub use posts::*;
pub use users::*;
