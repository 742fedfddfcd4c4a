//! Product business logic - Lookups, creation and price changes.
//!
//! Transactions only ever read products. Creation feeds the catalog seeding and
//! price changes exist so that the snapshot behaviour of line items can be
//! relied upon: a new price never touches existing lines.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves a specific product by its unique ID.
///
/// Generic over the connection so it can run inside an open transaction.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a product by its exact name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_name<C>(db: &C, name: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Name.eq(name))
        .order_by_asc(product::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative
/// - The database insert operation fails
pub async fn create_product<C>(
    db: &C,
    name: String,
    description: Option<String>,
    measure: String,
    product_type: String,
    price: i64,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::InvalidValue {
            field: "name",
            value: name,
        });
    }

    if price < 0 {
        return Err(Error::InvalidValue {
            field: "price",
            value: price.to_string(),
        });
    }

    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        measure: Set(measure),
        product_type: Set(product_type),
        price: Set(price),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Changes the live price of a product. Existing line items keep their snapshot.
///
/// # Errors
/// Returns an error if:
/// - The price is negative
/// - The product does not exist
/// - The database update operation fails
pub async fn update_product_price<C>(db: &C, product_id: i64, new_price: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if new_price < 0 {
        return Err(Error::InvalidValue {
            field: "price",
            value: new_price.to_string(),
        });
    }

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { product_id })?
        .into();

    product.price = Set(new_price);
    product.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_product(
            &db,
            "   ".to_string(),
            None,
            "kg".to_string(),
            "insumo".to_string(),
            10,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidValue { field: "name", .. })));

        let result = create_product(
            &db,
            "Harina".to_string(),
            None,
            "kg".to_string(),
            "insumo".to_string(),
            -1,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidValue { field: "price", .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_get_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let product = create_test_product(&db, "Harina", 500).await?;
        assert_eq!(product.name, "Harina");
        assert_eq!(product.price, 500);

        let found = get_product_by_id(&db, product.id).await?;
        assert_eq!(found, Some(product.clone()));

        let by_name = get_product_by_name(&db, "Harina").await?;
        assert_eq!(by_name.unwrap().id, product.id);

        assert!(get_product_by_id(&db, 999).await?.is_none());
        assert!(get_product_by_name(&db, "Azúcar").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_price_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Aceite", 1200).await?;

        let updated = update_product_price(&db, product.id, 1500).await?;
        assert_eq!(updated.price, 1500);

        let retrieved = Product::find_by_id(product.id).one(&db).await?.unwrap();
        assert_eq!(retrieved.price, 1500);

        let missing = update_product_price(&db, 999, 10).await;
        assert!(matches!(missing, Err(Error::ProductNotFound { product_id: 999 })));

        Ok(())
    }
}
