//! Users and the endpoints for managing them.

mod core;
mod endpoints;

pub use core::{User, UserId, create_user, create_user_table, get_all_users, get_user, user_exists};
pub use endpoints::{create_user_endpoint, get_user_endpoint, get_users_endpoint};
