pub mod expense;

pub use expense::{ExpenseDetails, ExpenseRecord};
