// Spreadsheet readers feeding the reconciliation engine

pub mod xlsx;

pub use xlsx::WorkbookSource;
