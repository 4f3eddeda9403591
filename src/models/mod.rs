pub mod directory_user;
pub mod ratings;
pub mod users;

pub use directory_user::{DirectoryUserRow, RegistrationOrder};
pub use ratings::RatingsRow;
pub use users::{Gender, UsersRow};
