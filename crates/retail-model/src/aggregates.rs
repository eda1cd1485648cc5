//! Derived aggregate records produced by the metrics engine.
//!
//! Aggregates are typed record structs rather than bare DataFrames so that
//! missing fields are construction-time errors; they are converted to frames
//! only at the output boundary.

use serde::Serialize;

/// Estimated cost as a fraction of estimated revenue.
pub const COST_RATIO: f64 = 0.6;

/// Sales-volume band for a product, classified by total sold quantity.
///
/// Bands use inclusive upper bounds: ≤0, ≤10, ≤50, and everything above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesBand {
    SinVentas,
    Bajas,
    Medias,
    Altas,
}

impl SalesBand {
    /// Classify a total sold quantity into its band.
    pub fn from_total_quantity(total_quantity: i64) -> Self {
        match total_quantity {
            q if q <= 0 => Self::SinVentas,
            q if q <= 10 => Self::Bajas,
            q if q <= 50 => Self::Medias,
            _ => Self::Altas,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SinVentas => "sin_ventas",
            Self::Bajas => "bajas",
            Self::Medias => "medias",
            Self::Altas => "altas",
        }
    }
}

impl std::fmt::Display for SalesBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total sales value for one category (null category forms its own bucket).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAggregate {
    pub category: Option<String>,
    /// Sum of `price * quantity` over the category's merged rows.
    pub total_sales: f64,
}

/// Per-product sales aggregate with profitability estimates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAggregate {
    pub product_id: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub total_quantity: i64,
    pub avg_price: f64,
    /// `avg_price * total_quantity`.
    pub estimated_revenue: f64,
    /// `COST_RATIO * estimated_revenue`.
    pub estimated_cost: f64,
    pub estimated_profit: f64,
    /// `profit / revenue`, or 0 when revenue is not positive.
    pub profit_margin: f64,
    pub sales_category: SalesBand,
}
