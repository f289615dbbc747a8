use rust_decimal::Decimal;
use std::{collections::HashMap, fmt, path::PathBuf};
use thiserror::Error;

pub type ProductId = String;
pub type Quantity = i64;

/// Number of fractional digits printed for every amount in the reports.
pub const REPORT_DIGITS: u32 = 2;

/// Display name used for a salesperson whose key isn't in the registry.
pub const UNKNOWN_SALESPERSON: &str = "Unknown";

// Default file layout, relative to the working directory.
pub const SELLERS_FILE: &str = "sellers.txt";
pub const PRODUCTS_FILE: &str = "products.txt";
pub const SALES_DIR: &str = "sales";
pub const SALES_REPORT_FILE: &str = "sales_report.csv";
pub const PRODUCTS_REPORT_FILE: &str = "products_report.csv";

/// Identity of a salesperson across the registry and the transaction files:
/// document type and document number glued together, trimmed and uppercased,
/// so that `cc; 123` and `CC;123` end up on the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SalespersonKey(String);

impl SalespersonKey {
    pub fn new(doc_type: &str, doc_number: &str) -> Self {
        Self(format!("{}{}", doc_type.trim(), doc_number.trim()).to_uppercase())
    }
}

impl fmt::Display for SalespersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
}

/// One `productId;quantity` line of a transaction file. Quantities aren't
/// checked for sign: a negative one is simply subtracted later on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineItem {
    pub product: ProductId,
    pub quantity: Quantity,
}

/// Reference tables, loaded once before any transaction is read and never
/// touched afterwards.
#[derive(Debug, Default)]
pub(crate) struct References {
    pub salespeople: HashMap<SalespersonKey, String>,
    pub products: HashMap<ProductId, Product>,
}

/// Everything that can abort a run. Malformed lines and unknown keys are not
/// in here: they are dealt with where they're found.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Sales folder not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("Invalid price {value:?} on line {line}")]
    InvalidPrice { line: u64, value: String },
    #[error("Invalid quantity {value:?} in {file} line {line}")]
    InvalidQuantity {
        file: String,
        line: u64,
        value: String,
    },
    #[error("Arithmetic overflow while accumulating {0}")]
    Overflow(String),
}
