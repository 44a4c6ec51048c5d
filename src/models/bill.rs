use serde::{Deserialize, Serialize};

/// A billing record. Rows are written by an external process; this service only lists them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bill {
    pub id: i64,
    /// Timestamp as stored, kept as text.
    pub date: String,
    pub total_amount: f64,
}
