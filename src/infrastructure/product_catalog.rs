use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sql_types::Text;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductCatalog;
use crate::domain::vendor::normalize_vendor_id;
use crate::schema::products;

use super::models::ProductRow;

define_sql_function!(fn lower(x: Text) -> Text);
define_sql_function!(fn btrim(x: Text) -> Text);

/// Vendor lookups against the catalog's `products` table.
pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductCatalog for DieselProductCatalog {
    fn vendors_of(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get()?;

        let rows = products::table
            .filter(products::id.eq_any(product_ids))
            .select(ProductRow::as_select())
            .load::<ProductRow>(&mut conn)?;

        Ok(rows.into_iter().map(|p| (p.id, p.vendor_id)).collect())
    }

    fn products_of_vendor(&self, vendor_id: &str) -> Result<Vec<Uuid>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(products::table
            .filter(lower(btrim(products::vendor_id)).eq(normalize_vendor_id(vendor_id)))
            .select(products::id)
            .load::<Uuid>(&mut conn)?)
    }
}
