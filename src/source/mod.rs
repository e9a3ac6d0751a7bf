/// Seeded synthetic household series.
pub mod synthetic;

pub use synthetic::SyntheticSource;
