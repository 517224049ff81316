use crate::domain::model::{CartId, VariantId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Variant not found in catalog: {variant_id}")]
    VariantNotFound { variant_id: VariantId },

    #[error("Line item not found for variant: {variant_id}")]
    LineItemNotFound { variant_id: VariantId },

    #[error("Cart {cart_id} is empty")]
    EmptyCartOperation { cart_id: CartId },

    #[error("Cart not found: {cart_id}")]
    CartNotFound { cart_id: CartId },

    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    #[error("Quantity overflow for variant {variant_id}")]
    QuantityOverflow { variant_id: VariantId },

    #[error("Price of variant {variant_id} overflows the cart total")]
    PriceOverflow { variant_id: VariantId },

    #[error("Cart {cart_id} was modified concurrently (expected version {expected}, found {actual})")]
    ConcurrentModification {
        cart_id: CartId,
        expected: u64,
        actual: u64,
    },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, CartError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 呼叫端輸入錯誤 (不重試)
    Client,
    /// 並發衝突 (可重新載入後重試)
    Conflict,
    /// 儲存層或 I/O 錯誤
    Infrastructure,
    /// 配置錯誤
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CartError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CartError::VariantNotFound { .. }
            | CartError::LineItemNotFound { .. }
            | CartError::EmptyCartOperation { .. }
            | CartError::CartNotFound { .. }
            | CartError::InvalidQuantity { .. }
            | CartError::QuantityOverflow { .. }
            | CartError::PriceOverflow { .. } => ErrorCategory::Client,
            CartError::ConcurrentModification { .. } => ErrorCategory::Conflict,
            CartError::StoreError { .. }
            | CartError::IoError(_)
            | CartError::CsvError(_)
            | CartError::SerializationError(_) => ErrorCategory::Infrastructure,
            CartError::ConfigValidationError { .. }
            | CartError::InvalidConfigValueError { .. }
            | CartError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client => ErrorSeverity::Low,
            ErrorCategory::Conflict => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Infrastructure => ErrorSeverity::Critical,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Client
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CartError::VariantNotFound { .. } => "Check that the variant id exists in the catalog",
            CartError::LineItemNotFound { .. } => "Add the item to the cart before changing its quantity",
            CartError::EmptyCartOperation { .. } => "Add at least one item to the cart first",
            CartError::CartNotFound { .. } => "Create the cart before mutating it",
            CartError::InvalidQuantity { .. } => "Use a quantity of at least 1",
            CartError::QuantityOverflow { .. } | CartError::PriceOverflow { .. } => "Use a smaller quantity",
            CartError::ConcurrentModification { .. } => "Reload the cart and retry the operation",
            CartError::StoreError { .. } => "Check the cart store and retry",
            CartError::IoError(_) => "Check file paths and permissions",
            CartError::CsvError(_) => "Check the catalog CSV format: variant_id,family,price,attributes",
            CartError::SerializationError(_) => "Check the JSON payload",
            CartError::ConfigValidationError { .. }
            | CartError::InvalidConfigValueError { .. }
            | CartError::MissingConfigError { .. } => "Fix the configuration file and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CartError::VariantNotFound { variant_id } => {
                format!("商品規格 {} 不存在", variant_id)
            }
            CartError::LineItemNotFound { variant_id } => {
                format!("購物車中沒有商品規格 {}", variant_id)
            }
            CartError::EmptyCartOperation { .. } => "購物車是空的".to_string(),
            CartError::ConcurrentModification { .. } => "購物車已被其他請求修改，請重試".to_string(),
            other => other.to_string(),
        }
    }
}
