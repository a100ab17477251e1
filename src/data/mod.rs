/// Data layer: raw tables, cleaning, the dataset, and record identity.
///
/// Architecture:
/// ```text
///  .csv / .txt / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (cells as read)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  clean cells → Dataset (columns, RecordId per row)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ identity  │  display names, designator resolution, search
///   └──────────┘
/// ```

pub mod clean;
pub mod identity;
pub mod loader;
pub mod model;
