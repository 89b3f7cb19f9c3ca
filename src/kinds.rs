//! Field maps for the admin panel's resource types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::field_map::{FieldKind, FieldMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Orders,
    Products,
    Stores,
    Categories,
    Users,
}

pub const ALL_KINDS: [ResourceKind; 5] = [
    ResourceKind::Orders,
    ResourceKind::Products,
    ResourceKind::Stores,
    ResourceKind::Categories,
    ResourceKind::Users,
];

/// Audit columns shared by the .NET entities.
fn with_audit_fields(map: FieldMap) -> FieldMap {
    map.flag("isDeleted")
        .reference("createdBy")
        .timestamp("createdDate")
        .reference("updatedBy")
        .timestamp("updatedDate")
        .reference("deletedBy")
        .timestamp("deletedDate")
}

impl ResourceKind {
    /// Lowercase plural used in logs and notification context.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Orders => "orders",
            ResourceKind::Products => "products",
            ResourceKind::Stores => "stores",
            ResourceKind::Categories => "categories",
            ResourceKind::Users => "users",
        }
    }

    /// Capitalized singular used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Orders => "Order",
            ResourceKind::Products => "Product",
            ResourceKind::Stores => "Store",
            ResourceKind::Categories => "Category",
            ResourceKind::Users => "User",
        }
    }

    /// Path segment below the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Orders => "orders",
            ResourceKind::Products => "Product",
            ResourceKind::Stores => "UserStore",
            ResourceKind::Categories => "category",
            ResourceKind::Users => "users",
        }
    }

    /// Canonical id field.
    pub fn id_field(self) -> &'static str {
        match self {
            ResourceKind::Orders => "orderId",
            ResourceKind::Products => "productId",
            ResourceKind::Stores => "userStoreId",
            ResourceKind::Categories => "categoryId",
            ResourceKind::Users => "id",
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Orders => &["orderName"],
            ResourceKind::Products => &[
                "typeId",
                "userStoreId",
                "productName",
                "productDescription",
            ],
            ResourceKind::Stores => &["merchantId", "storeName"],
            ResourceKind::Categories => &["categoryName"],
            ResourceKind::Users => &["name", "email"],
        }
    }

    pub fn field_map(self) -> FieldMap {
        match self {
            ResourceKind::Products => with_audit_fields(
                FieldMap::new()
                    .reference("productId")
                    .reference("typeId")
                    .reference("userStoreId")
                    .text("productName")
                    .text("productDescription"),
            )
            .pascal_writes(),
            ResourceKind::Stores => with_audit_fields(
                FieldMap::new()
                    .reference("userStoreId")
                    .text("merchantId")
                    .text("storeName")
                    .reference("inventoryId")
                    .reference("categoryId"),
            )
            .pascal_writes(),
            ResourceKind::Categories => FieldMap::new()
                .reference("categoryId")
                .alias("categoryId", "id")
                .text("categoryName")
                .alias("categoryName", "name")
                .text("categoryDescription")
                .alias("categoryDescription", "description")
                .text("imageUrl")
                .alias("imageUrl", "image")
                .flag("isDeleted")
                .timestamp("createdDate"),
            ResourceKind::Users => FieldMap::new()
                .reference("id")
                .alias("id", "userId")
                .text("name")
                .alias("name", "userName")
                .write_as("name", "userName")
                .text("email")
                .text("role")
                .text("mobile")
                .text("address"),
            ResourceKind::Orders => FieldMap::new()
                .reference("orderId")
                .alias("orderId", "id")
                .text("orderName")
                .alias("orderName", "name")
                .reference("categoryId")
                .text("categoryName")
                .alias("categoryName", "category")
                .text("description")
                .field("total", FieldKind::Value)
                .alias("total", "amount")
                .alias("total", "orderTotal")
                .alias("total", "price")
                .text("imageUrl")
                .flag("isDeleted")
                .timestamp("createdDate"),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KINDS
            .into_iter()
            .find(|k| {
                k.name() == wanted
                    || k.label().eq_ignore_ascii_case(&wanted)
                    || k.path().eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| format!("Unknown resource type: {s}"))
    }
}
