//! Person lookups.
//!
//! Persons are owned by another service. This module only reads them, plus a
//! plain insert used when seeding the catalog and in tests.

use crate::{
    entities::{Person, person},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Finds a person by RUT, returning None if absent.
///
/// Generic over the connection so it can run inside an open transaction.
pub async fn get_person_by_rut<C>(db: &C, rut: &str) -> Result<Option<person::Model>>
where
    C: ConnectionTrait,
{
    Person::find_by_id(rut.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_person_by_rut`] but a missing person is an error.
///
/// # Errors
/// Returns [`Error::PersonNotFound`] if no person has this RUT.
pub async fn require_person<C>(db: &C, rut: &str) -> Result<person::Model>
where
    C: ConnectionTrait,
{
    get_person_by_rut(db, rut)
        .await?
        .ok_or_else(|| Error::PersonNotFound {
            rut: rut.to_string(),
        })
}

/// Inserts a person.
///
/// # Errors
/// Returns an error if the RUT or name is blank, or if the insert fails
/// (including when the RUT already exists).
pub async fn create_person<C>(
    db: &C,
    rut: String,
    name: String,
    last_name: Option<String>,
    beneficiary_id: Option<i32>,
) -> Result<person::Model>
where
    C: ConnectionTrait,
{
    if rut.trim().is_empty() {
        return Err(Error::InvalidValue {
            field: "rut",
            value: rut,
        });
    }
    if name.trim().is_empty() {
        return Err(Error::InvalidValue {
            field: "name",
            value: name,
        });
    }

    let person = person::ActiveModel {
        rut: Set(rut.trim().to_string()),
        name: Set(name.trim().to_string()),
        last_name: Set(last_name),
        beneficiary_id: Set(beneficiary_id),
    };
    person.insert(db).await.map_err(Into::into)
}
