//! Defines the user model and the database queries for users.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::Error;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A newtype wrapper for integer user IDs.
///
/// User IDs are chosen by the client when the user is created, rather than
/// generated by the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's client-assigned ID.
    pub id: UserId,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's date of birth.
    #[serde(with = "iso_date")]
    pub birthday: Date,
}

impl User {
    /// Validate the fields for a new user.
    ///
    /// Names are trimmed of surrounding whitespace and `birthday` must be
    /// formatted as `YYYY-MM-DD`.
    ///
    /// # Errors
    /// Returns an [Error::EmptyFirstName] or [Error::EmptyLastName] if a name
    /// is empty after trimming, or [Error::InvalidBirthday] if `birthday`
    /// is not a valid date.
    pub fn build(id: UserId, first_name: &str, last_name: &str, birthday: &str) -> Result<Self, Error> {
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(Error::EmptyFirstName);
        }

        let last_name = last_name.trim();
        if last_name.is_empty() {
            return Err(Error::EmptyLastName);
        }

        let birthday = Date::parse(birthday.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(|_| Error::InvalidBirthday(birthday.to_owned()))?;

        Ok(Self {
            id,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            birthday,
        })
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                birthday TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::DuplicateUser] if a user with the same ID already exists,
/// or a [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(user: User, connection: &Connection) -> Result<User, Error> {
    connection
        .execute(
            "INSERT INTO user (id, first_name, last_name, birthday) VALUES (?1, ?2, ?3, ?4)",
            (
                user.id.as_i64(),
                &user.first_name,
                &user.last_name,
                user.birthday,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code:
                        rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateUser(user.id),
            error => error.into(),
        })?;

    Ok(user)
}

/// Get the user from the database that has the specified `id`.
///
/// # Errors
///
/// Returns a [Error::UserNotFound] if no user has `id`, or a
/// [Error::SqlError] if some other SQL related error occurred.
pub fn get_user(id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, first_name, last_name, birthday FROM user WHERE id = :id")?
        .query_row(&[(":id", &id.as_i64())], map_user_row)
        .optional()?
        .ok_or(Error::UserNotFound(id))
}

/// Get all users ordered by ID.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, first_name, last_name, birthday FROM user ORDER BY id ASC")?
        .query_map([], map_user_row)?
        .map(|maybe_user| maybe_user.map_err(|error| error.into()))
        .collect()
}

/// Whether a user with `id` exists in the database.
pub fn user_exists(id: UserId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1)",
            (id.as_i64(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserId::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birthday: row.get(3)?,
    })
}
