//! Static resource catalog: every generic REST collection and its table shape.
//! SQL identifiers are only ever taken from these definitions, never from input.

/// One writable/filterable column with its PostgreSQL type (used for SQL casts
/// and for the startup DDL).
#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub pg_type: &'static str,
}

const fn col(name: &'static str, pg_type: &'static str) -> ColumnDef {
    ColumnDef { name, pg_type }
}

#[derive(Clone, Copy, Debug)]
pub struct ResourceDef {
    pub path_segment: &'static str,
    pub table: &'static str,
    /// Creation-time column; lists are ordered by it, descending.
    pub order_by: &'static str,
    pub columns: &'static [ColumnDef],
    /// Case-insensitive substring search targets, OR-combined.
    pub search_columns: &'static [&'static str],
    pub required: &'static [&'static str],
    pub deletable: bool,
}

impl ResourceDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

pub const EQUIPMENT_PLACEHOLDER_IMAGE: &str = "/uploads/placeholder-equipment.png";

pub const EQUIPMENT: ResourceDef = ResourceDef {
    path_segment: "equipment",
    table: "equipment",
    order_by: "created_at",
    columns: &[
        col("name", "text"),
        col("category", "text"),
        col("description", "text"),
        col("price_per_day", "numeric"),
        col("location", "text"),
        col("owner_id", "text"),
        col("availability", "text"),
        col("image_url", "text"),
    ],
    search_columns: &["name", "description", "location"],
    required: &["name", "category", "price_per_day"],
    deletable: true,
};

const BULK_DEALS: ResourceDef = ResourceDef {
    path_segment: "bulk-deals",
    table: "bulk_deals",
    order_by: "created_at",
    columns: &[
        col("title", "text"),
        col("crop", "text"),
        col("description", "text"),
        col("target_quantity", "numeric"),
        col("current_quantity", "numeric"),
        col("price_per_unit", "numeric"),
        col("region", "text"),
        col("status", "text"),
        col("deadline", "timestamptz"),
    ],
    search_columns: &["title", "crop"],
    required: &["title", "crop"],
    deletable: false,
};

const LENDING_CIRCLES: ResourceDef = ResourceDef {
    path_segment: "lending",
    table: "lending_circles",
    order_by: "created_at",
    columns: &[
        col("name", "text"),
        col("village", "text"),
        col("description", "text"),
        col("member_count", "int"),
        col("total_pool", "numeric"),
        col("contribution_amount", "numeric"),
        col("status", "text"),
    ],
    search_columns: &["name", "village"],
    required: &["name", "village"],
    deletable: false,
};

const LOANS: ResourceDef = ResourceDef {
    path_segment: "loans",
    table: "loans",
    order_by: "created_at",
    columns: &[
        col("circle_id", "uuid"),
        col("borrower_id", "text"),
        col("amount", "numeric"),
        col("purpose", "text"),
        col("interest_rate", "numeric"),
        col("status", "text"),
        col("due_date", "timestamptz"),
    ],
    search_columns: &[],
    required: &["circle_id", "borrower_id", "amount"],
    deletable: false,
};

const EXPENSES: ResourceDef = ResourceDef {
    path_segment: "expenses",
    table: "expenses",
    order_by: "created_at",
    columns: &[
        col("user_id", "text"),
        col("category", "text"),
        col("description", "text"),
        col("amount", "numeric"),
        col("expense_date", "timestamptz"),
        col("season", "text"),
    ],
    search_columns: &["description", "category"],
    required: &["category", "amount"],
    deletable: true,
};

const MARKET_TRENDS: ResourceDef = ResourceDef {
    path_segment: "market",
    table: "market_trends",
    order_by: "created_at",
    columns: &[
        col("crop", "text"),
        col("region", "text"),
        col("price", "numeric"),
        col("unit", "text"),
        col("trend", "text"),
        col("recorded_at", "timestamptz"),
    ],
    search_columns: &["crop", "region"],
    required: &["crop", "price"],
    deletable: false,
};

const MARKET_ALERTS: ResourceDef = ResourceDef {
    path_segment: "market-alerts",
    table: "market_alerts",
    order_by: "created_at",
    columns: &[
        col("crop", "text"),
        col("region", "text"),
        col("message", "text"),
        col("severity", "text"),
    ],
    search_columns: &["crop", "message"],
    required: &["crop", "message"],
    deletable: false,
};

const SCHEMES: ResourceDef = ResourceDef {
    path_segment: "schemes",
    table: "schemes",
    order_by: "created_at",
    columns: &[
        col("name", "text"),
        col("description", "text"),
        col("category", "text"),
        col("eligibility", "text"),
        col("benefit", "text"),
        col("application_url", "text"),
        col("deadline", "timestamptz"),
    ],
    search_columns: &["name", "description", "category"],
    required: &["name", "description"],
    deletable: false,
};

pub const RESOURCES: &[ResourceDef] = &[
    EQUIPMENT,
    BULK_DEALS,
    LENDING_CIRCLES,
    LOANS,
    EXPENSES,
    MARKET_TRENDS,
    MARKET_ALERTS,
    SCHEMES,
];

pub fn resource_by_path(segment: &str) -> Option<&'static ResourceDef> {
    RESOURCES.iter().find(|r| r.path_segment == segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn path_segments_are_unique() {
        let mut seen = HashSet::new();
        for r in RESOURCES {
            assert!(seen.insert(r.path_segment), "duplicate segment {}", r.path_segment);
        }
    }

    #[test]
    fn search_and_required_columns_exist() {
        for r in RESOURCES {
            for s in r.search_columns {
                assert!(r.has_column(s), "{}: unknown search column {}", r.path_segment, s);
            }
            for req in r.required {
                assert!(r.has_column(req), "{}: unknown required column {}", r.path_segment, req);
            }
        }
    }

    #[test]
    fn lookup_by_path() {
        assert_eq!(resource_by_path("bulk-deals").unwrap().table, "bulk_deals");
        assert!(resource_by_path("forum").is_none());
        assert!(resource_by_path("unknown").is_none());
    }
}
