//! Business-rule outcomes returned as values rather than errors.

use std::fmt;

use serde::Serialize;

use super::types::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    SelfFollow,
    AlreadyFollowing,
    AlreadyLiked,
    HideOwnPost,
    EmailTaken,
    UserNameTaken,
    InvalidCredentials,
    AccountLocked,
    InvalidInput,
    Missing(Collection),
}

impl Rejection {
    pub fn message(self) -> String {
        match self {
            Rejection::SelfFollow => "cannot follow yourself".to_string(),
            Rejection::AlreadyFollowing => "already following".to_string(),
            Rejection::AlreadyLiked => "already liked".to_string(),
            Rejection::HideOwnPost => "Cannot hide own posts".to_string(),
            Rejection::EmailTaken => "email already exists".to_string(),
            Rejection::UserNameTaken => "username already exists".to_string(),
            Rejection::InvalidCredentials => "Incorrect Email or Password".to_string(),
            Rejection::AccountLocked => "account locked".to_string(),
            Rejection::InvalidInput => "invalid input".to_string(),
            Rejection::Missing(collection) => format!("{collection} doesn't exist"),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl Serialize for Rejection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message())
    }
}

/// Result of a mutating operation that passed infrastructure checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Rejected(rejection) => Some(*rejection),
        }
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Rejected(rejection) => Outcome::Rejected(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_the_collection() {
        assert_eq!(
            Rejection::Missing(Collection::Like).message(),
            "like doesn't exist"
        );
        assert_eq!(
            Rejection::Missing(Collection::Following).to_string(),
            "following doesn't exist"
        );
    }

    #[test]
    fn outcome_map_keeps_rejection() {
        let rejected: Outcome<u8> = Outcome::Rejected(Rejection::AlreadyLiked);
        assert_eq!(
            rejected.map(|v| v + 1).rejection(),
            Some(Rejection::AlreadyLiked)
        );
        assert_eq!(Outcome::Done(1u8).map(|v| v + 1).done(), Some(2));
    }
}
