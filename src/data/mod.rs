/// Data layer: core types, loading, caching and derived views.
///
/// Architecture:
/// ```text
///  emissions .csv / .parquet        boundaries .csv (ISO_A3, NAME)
///        │                                 │
///        ▼                                 ▼
///   ┌──────────┐                     ┌────────────┐
///   │  loader   │  → EmissionsTable  │ boundaries │ → BoundaryTable
///   └──────────┘                     └────────────┘
///        │   (memoized per path in `cache`)   │
///        ▼                                    ▼
///   ┌──────────┐   QueryParams        ┌────────────┐
///   │ metrics   │ ◄──────────────     │  map_view  │
///   └──────────┘                      └────────────┘
///        │
///        ▼
///   small derived tables for the UI
/// ```

pub mod boundaries;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
