// SPDX-License-Identifier: MIT

//! ID newtypes.
//!
//! Two families are used across the pipeline:
//! - row ids ([`define_row_id!`]): monotonic `i64` primary keys assigned by
//!   SQLite for Screenshot/Event/Activity/OCRResult/Todo rows.
//! - opaque ids ([`define_id!`]): `{prefix}{nanoid}` strings for entities
//!   that are not SQLite rows (scheduled jobs, traces, sessions).

/// Define a newtype wrapper around `i64` for a database row id.
#[macro_export]
macro_rules! define_row_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

/// Define a newtype ID wrapper with a type prefix and a random nanoid suffix.
///
/// The store holds the *string*, never a serialized closure or struct, so
/// upgrades never invalidate persisted state.
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* pub struct $name:ident($prefix:literal);) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random id with the type prefix.
            pub fn new() -> Self {
                Self(format!("{}{}", Self::PREFIX, nanoid::nanoid!(16)))
            }

            /// Build from an existing string (parsing/deserialization).
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
