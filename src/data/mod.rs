//! Data layer: core types, loading, caching, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet / http(s)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse source → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  cache    │  one outcome per source, per session
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  apply category selections → filtered Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  group count / sum, top-N, inner join
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
