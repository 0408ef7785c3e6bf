/// Data layer: core types, loading, the dataset store and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (uns: key → InteractionTable)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DatasetStore │  every configured dataset, loaded once at startup
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  weight threshold / cell-type pair → filtered table
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;
