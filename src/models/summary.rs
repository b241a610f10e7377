use super::transaction::TransactionType;

/// One row of the monthly aggregation: all transactions sharing a category and type.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCategoryTotal {
    pub category: String,
    pub transaction_type: TransactionType,
    pub total: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IncomeExpense {
    pub income: f64,
    pub expense: f64,
}

impl IncomeExpense {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}
