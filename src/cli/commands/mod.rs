mod hash_password;
mod user;

pub use hash_password::cmd_hash_password;
pub use user::{cmd_user_add, cmd_user_list};
