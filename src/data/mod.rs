/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  upload (.csv / .txt / .xlsx / .xls)  or  fallback sample
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  dates    │  coerce Date, drop bad rows, bounds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date window → 4-stage categorical cascade
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  counts, sums, top-N, monthly trend
///   └───────────┘
/// ```

pub mod aggregate;
pub mod dates;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
