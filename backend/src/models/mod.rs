//! Domain models for the shoplens analysis pipeline.
//!
//! - [`TransactionRecord`] - One validated row of the raw table
//! - [`AugmentedRecord`] - A record plus its derived fields
//! - [`ReturnFlag`] - Enumerated return indicator
//! - [`TimePeriod`] / [`AgeGroup`] - Bucket labels
//! - [`NumericColumn`] / [`CategoricalColumn`] - Declared column sets

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

// =============================================================================
// Return Flag
// =============================================================================

/// Whether the purchase was returned.
///
/// Source exports spell this in several ways (`Sí`, `Yes`, `1`...), so the
/// accepted tokens are enumerated instead of matched against one string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReturnFlag {
    Returned,
    Kept,
}

impl ReturnFlag {
    /// Human-readable description of the accepted tokens.
    pub const DOMAIN: &'static str = "one of sí/si/yes/y/true/1 or no/n/false/0";

    /// Parse a flag token (case and accent insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = token.trim().to_lowercase().replace('í', "i");
        match normalized.as_str() {
            "si" | "yes" | "y" | "true" | "1" => Some(Self::Returned),
            "no" | "n" | "false" | "0" => Some(Self::Kept),
            _ => None,
        }
    }

    pub fn is_returned(self) -> bool {
        matches!(self, Self::Returned)
    }

    /// Canonical label used in outputs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Returned => "Yes",
            Self::Kept => "No",
        }
    }
}

// =============================================================================
// Buckets
// =============================================================================

/// Part of the day a purchase falls into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimePeriod {
    #[serde(rename = "Morning")]
    Morning,
    #[serde(rename = "Afternoon")]
    Afternoon,
    #[serde(rename = "Night")]
    Night,
    #[serde(rename = "Late Night")]
    LateNight,
}

impl TimePeriod {
    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Night => "Night",
            Self::LateNight => "Late Night",
        }
    }
}

/// Customer age bracket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeGroup {
    #[serde(rename = "18-24")]
    Under25,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55+")]
    From55,
}

impl AgeGroup {
    pub fn label(self) -> &'static str {
        match self {
            Self::Under25 => "18-24",
            Self::From25To34 => "25-34",
            Self::From35To44 => "35-44",
            Self::From45To54 => "45-54",
            Self::From55 => "55+",
        }
    }
}

// =============================================================================
// Transaction Record
// =============================================================================

/// One validated row of the raw transaction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub purchase_date: NaiveDateTime,
    pub purchase_hour: u8,
    pub customer_age: u32,
    pub customer_gender: String,
    pub product_category: String,
    pub product_price: f64,
    pub quantity: u32,
    pub discount_applied: f64,
    pub shipping_cost: f64,
    pub delivery_days: u32,
    pub payment_method: String,
    pub customer_satisfaction: u8,
    pub return_flag: ReturnFlag,
    pub total_amount: f64,
}

impl TransactionRecord {
    /// Value of a declared numeric column.
    pub fn numeric(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::CustomerAge => self.customer_age as f64,
            NumericColumn::ProductPrice => self.product_price,
            NumericColumn::Quantity => self.quantity as f64,
            NumericColumn::TotalAmount => self.total_amount,
            NumericColumn::DiscountApplied => self.discount_applied,
            NumericColumn::ShippingCost => self.shipping_cost,
            NumericColumn::DeliveryDays => self.delivery_days as f64,
            NumericColumn::CustomerSatisfaction => self.customer_satisfaction as f64,
        }
    }

    /// Value of a declared categorical column.
    pub fn categorical(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::CustomerGender => &self.customer_gender,
            CategoricalColumn::ProductCategory => &self.product_category,
            CategoricalColumn::PaymentMethod => &self.payment_method,
            CategoricalColumn::ReturnFlag => self.return_flag.label(),
        }
    }

    /// The purchase timestamp as written to the processed table.
    ///
    /// Midnight timestamps are written as plain dates.
    pub fn purchase_date_text(&self) -> String {
        let at = self.purchase_date;
        if at.hour() == 0 && at.minute() == 0 && at.second() == 0 {
            at.format("%Y-%m-%d").to_string()
        } else {
            at.format("%Y-%m-%d %H:%M:%S").to_string()
        }
    }

    /// Calendar month (1-12).
    pub fn month(&self) -> u32 {
        self.purchase_date.month()
    }
}

// =============================================================================
// Augmented Record
// =============================================================================

/// A transaction record with all derived fields populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedRecord {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub purchase_month: u32,
    pub purchase_month_name: String,
    pub purchase_weekday: String,
    pub time_period: TimePeriod,
    pub discounted_price: f64,
    pub margin: f64,
    pub age_group: AgeGroup,
}

// =============================================================================
// Column Sets
// =============================================================================

/// The declared numeric columns, in declared order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    CustomerAge,
    ProductPrice,
    Quantity,
    TotalAmount,
    DiscountApplied,
    ShippingCost,
    DeliveryDays,
    CustomerSatisfaction,
}

impl NumericColumn {
    /// Declared order; every per-column aggregate follows it.
    pub const ALL: [NumericColumn; 8] = [
        NumericColumn::CustomerAge,
        NumericColumn::ProductPrice,
        NumericColumn::Quantity,
        NumericColumn::TotalAmount,
        NumericColumn::DiscountApplied,
        NumericColumn::ShippingCost,
        NumericColumn::DeliveryDays,
        NumericColumn::CustomerSatisfaction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CustomerAge => "customer_age",
            Self::ProductPrice => "product_price",
            Self::Quantity => "quantity",
            Self::TotalAmount => "total_amount",
            Self::DiscountApplied => "discount_applied",
            Self::ShippingCost => "shipping_cost",
            Self::DeliveryDays => "delivery_days",
            Self::CustomerSatisfaction => "customer_satisfaction",
        }
    }
}

/// The categorical columns summarized with value counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    CustomerGender,
    ProductCategory,
    PaymentMethod,
    ReturnFlag,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 4] = [
        CategoricalColumn::CustomerGender,
        CategoricalColumn::ProductCategory,
        CategoricalColumn::PaymentMethod,
        CategoricalColumn::ReturnFlag,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CustomerGender => "customer_gender",
            Self::ProductCategory => "product_category",
            Self::PaymentMethod => "payment_method",
            Self::ReturnFlag => "return_flag",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
