//! Brand references across two historical catalog representations.
//!
//! The catalog underwent a migration from free-form string brand tags to
//! referential brand IDs, and both forms still coexist in production data.
//! [`BrandRef`] models the field as a tagged union so the ambiguity is
//! resolved explicitly at read time instead of by runtime type inspection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::BrandId;

/// A product's brand field: either a reference to a `Brand` row or a legacy
/// embedded display string.
///
/// The untagged serde representation mirrors the mixed-type source field:
/// a UUID string deserializes as [`BrandRef::Id`], anything else as
/// [`BrandRef::Legacy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrandRef {
    /// Referential form: points at a `Brand` row (which may no longer exist).
    Id(BrandId),
    /// Legacy form: the brand display name embedded verbatim.
    Legacy(String),
}

impl BrandRef {
    /// Build a brand reference from the two catalog columns.
    ///
    /// The referential column wins when both are populated; a product with
    /// neither column set has no brand.
    #[must_use]
    pub fn from_catalog_columns(brand_id: Option<Uuid>, brand_name: Option<String>) -> Option<Self> {
        match (brand_id, brand_name) {
            (Some(id), _) => Some(Self::Id(BrandId::new(id))),
            (None, Some(name)) => Some(Self::Legacy(name)),
            (None, None) => None,
        }
    }
}
