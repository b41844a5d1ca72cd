//! Common test utilities for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use shoplens::{ReturnFlag, TransactionRecord};

pub const HEADER: [&str; 15] = [
    "Transaction_ID",
    "Purchase_Date",
    "Purchase_Hour",
    "Customer_Age",
    "Customer_Gender",
    "Product_Category",
    "Product_Price",
    "Quantity",
    "Discount_Applied",
    "Shipping_Cost",
    "Delivery_Days",
    "Payment_Method",
    "Customer_Satisfaction",
    "Return_Flag",
    "Total_Amount",
];

const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Home", "Books", "Toys"];
const PAYMENTS: [&str; 4] = ["Card", "Cash", "PayPal", "Transfer"];
const GENDERS: [&str; 2] = ["F", "M"];

/// Small deterministic generator so fixtures never change between runs.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

/// `n` varied but valid records.
pub fn sample_records(n: usize) -> Vec<TransactionRecord> {
    let mut rng = Lcg(42);
    (0..n)
        .map(|i| {
            let price = 10.0 + rng.below(490) as f64;
            let quantity = 1 + rng.below(4) as u32;
            let discount = (rng.below(5) * 5) as f64;
            let shipping = rng.below(20) as f64;
            let month = 1 + (i % 12) as u32;
            let day = 1 + (i % 28) as u32;

            TransactionRecord {
                transaction_id: format!("TX{:04}", i + 1),
                purchase_date: NaiveDate::from_ymd_opt(2024, month, day)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                purchase_hour: rng.below(24) as u8,
                customer_age: 18 + rng.below(50) as u32,
                customer_gender: GENDERS[rng.below(2) as usize].to_string(),
                product_category: CATEGORIES[rng.below(5) as usize].to_string(),
                product_price: price,
                quantity,
                discount_applied: discount,
                shipping_cost: shipping,
                delivery_days: 1 + rng.below(10) as u32,
                payment_method: PAYMENTS[rng.below(4) as usize].to_string(),
                customer_satisfaction: 1 + rng.below(5) as u8,
                return_flag: if rng.below(4) == 0 { ReturnFlag::Returned } else { ReturnFlag::Kept },
                total_amount: price * quantity as f64 * (1.0 - discount / 100.0) + shipping,
            }
        })
        .collect()
}

/// Render records as CSV text with the export's column spelling.
pub fn to_csv(records: &[TransactionRecord], delimiter: char) -> String {
    let sep = delimiter.to_string();
    let mut out = HEADER.join(&sep);
    for r in records {
        let flag = if r.return_flag.is_returned() { "Sí" } else { "No" };
        let fields = [
            r.transaction_id.clone(),
            r.purchase_date.format("%Y-%m-%d").to_string(),
            r.purchase_hour.to_string(),
            r.customer_age.to_string(),
            r.customer_gender.clone(),
            r.product_category.clone(),
            r.product_price.to_string(),
            r.quantity.to_string(),
            r.discount_applied.to_string(),
            r.shipping_cost.to_string(),
            r.delivery_days.to_string(),
            r.payment_method.clone(),
            r.customer_satisfaction.to_string(),
            flag.to_string(),
            r.total_amount.to_string(),
        ];
        out.push('\n');
        out.push_str(&fields.join(&sep));
    }
    out.push('\n');
    out
}

/// Encode text as ISO-8859-1 bytes (every char must be below U+0100).
pub fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u32 as u8).collect()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
