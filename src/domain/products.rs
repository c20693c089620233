//! Product listing vocabulary and the rules every stored product obeys.

use std::fmt;

use crate::domain::entities::ProductRecord;

/// Columns a listing may be ordered by. Anything else falls back to
/// [`SortColumn::CreatedAt`], so user input never reaches the ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Name,
    Price,
    StockQuantity,
    #[default]
    CreatedAt,
    CategoryId,
}

impl SortColumn {
    const ALLOWED: [SortColumn; 5] = [
        SortColumn::Name,
        SortColumn::Price,
        SortColumn::StockQuantity,
        SortColumn::CreatedAt,
        SortColumn::CategoryId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Price => "price",
            SortColumn::StockQuantity => "stock_quantity",
            SortColumn::CreatedAt => "created_at",
            SortColumn::CategoryId => "category_id",
        }
    }

    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|raw| {
            Self::ALLOWED
                .into_iter()
                .find(|column| column.as_str() == raw)
        })
        .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Only the exact token `asc` selects ascending order.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductSort {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl ProductSort {
    pub fn resolve(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        Self {
            column: SortColumn::resolve(sort_by),
            order: SortOrder::resolve(sort_order),
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column.as_str(), self.order.as_sql())
    }
}

/// Conjunctive product predicate; absent fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub stock_min: Option<i32>,
    pub stock_max: Option<i32>,
}

impl ProductFilter {
    /// Blank name searches are treated as absent.
    pub fn normalized(mut self) -> Self {
        self.name = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self
    }
}

/// Mutable fields of a product, as written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub category_id: i64,
}

impl ProductFields {
    /// Returns the name of the first violated field constraint.
    pub fn check(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name");
        }
        if self.description.trim().is_empty() {
            return Err("description");
        }
        if self.price <= 0 {
            return Err("price");
        }
        if self.stock_quantity < 0 {
            return Err("stock_quantity");
        }
        if self.category_id <= 0 {
            return Err("category_id");
        }
        Ok(())
    }
}

impl From<&ProductRecord> for ProductFields {
    fn from(record: &ProductRecord) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            price: record.price,
            stock_quantity: record.stock_quantity,
            is_active: record.is_active,
            category_id: record.category_id,
        }
    }
}

/// Partial update; only present fields replace stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock_quantity: Option<i32>,
    pub is_active: Option<bool>,
    pub category_id: Option<i64>,
}

impl ProductPatch {
    pub fn apply(self, mut fields: ProductFields) -> ProductFields {
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(price) = self.price {
            fields.price = price;
        }
        if let Some(stock_quantity) = self.stock_quantity {
            fields.stock_quantity = stock_quantity;
        }
        if let Some(is_active) = self.is_active {
            fields.is_active = is_active;
        }
        if let Some(category_id) = self.category_id {
            fields.category_id = category_id;
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hammer() -> ProductFields {
        ProductFields {
            name: "Hammer".to_string(),
            description: "Claw hammer".to_string(),
            price: 10,
            stock_quantity: 5,
            is_active: true,
            category_id: 1,
        }
    }

    #[test]
    fn unknown_sort_column_falls_back_to_created_at() {
        assert_eq!(SortColumn::resolve(Some("price")), SortColumn::Price);
        assert_eq!(
            SortColumn::resolve(Some("price; DROP TABLE products")),
            SortColumn::CreatedAt
        );
        assert_eq!(SortColumn::resolve(Some("PRICE")), SortColumn::CreatedAt);
        assert_eq!(SortColumn::resolve(None), SortColumn::CreatedAt);
    }

    #[test]
    fn only_exact_asc_sorts_ascending() {
        assert_eq!(SortOrder::resolve(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::resolve(Some("ASC")), SortOrder::Desc);
        assert_eq!(SortOrder::resolve(Some("up")), SortOrder::Desc);
        assert_eq!(SortOrder::resolve(None), SortOrder::Desc);
    }

    #[test]
    fn sort_display_matches_sql_fragment() {
        let sort = ProductSort::resolve(Some("stock_quantity"), Some("asc"));
        assert_eq!(sort.to_string(), "stock_quantity ASC");
    }

    #[test]
    fn blank_name_filter_is_dropped() {
        let filter = ProductFilter {
            name: Some("   ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.name, None);

        let filter = ProductFilter {
            name: Some(" ham ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.name.as_deref(), Some("ham"));
    }

    #[test]
    fn patch_replaces_only_present_fields() {
        let patch = ProductPatch {
            price: Some(20),
            is_active: Some(false),
            ..Default::default()
        };

        let merged = patch.apply(hammer());

        assert_eq!(merged.price, 20);
        assert!(!merged.is_active);
        assert_eq!(merged.name, "Hammer");
        assert_eq!(merged.stock_quantity, 5);
        assert_eq!(merged.category_id, 1);
    }

    #[test]
    fn empty_patch_is_identity() {
        assert_eq!(ProductPatch::default().apply(hammer()), hammer());
    }

    #[test]
    fn check_reports_first_violation() {
        assert_eq!(hammer().check(), Ok(()));

        let mut fields = hammer();
        fields.price = 0;
        assert_eq!(fields.check(), Err("price"));

        let mut fields = hammer();
        fields.stock_quantity = 0;
        assert_eq!(fields.check(), Ok(()));
        fields.stock_quantity = -1;
        assert_eq!(fields.check(), Err("stock_quantity"));
    }
}
