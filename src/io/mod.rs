/// CSV export of rows and input series.
pub mod export;
/// CSV import of input series.
pub mod import;
