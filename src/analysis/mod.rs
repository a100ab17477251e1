//! Aggregation over identity-tagged series.
//!
//! ```text
//!  DerivedSeries (x)   DerivedSeries (y)
//!         │                   │
//!         └──────┬────────────┘
//!                ▼
//!          ┌──────────┐
//!          │  align    │  identity intersection → JointSample
//!          └──────────┘
//!                │
//!       ┌────────┼──────────────┐
//!       ▼        ▼              ▼
//!  ┌─────────┐ ┌───────────┐ ┌──────────────┐
//!  │  stats   │ │ histogram │ │ distribution │
//!  └─────────┘ └───────────┘ └──────────────┘
//!                     │  density: bar heights + KDE curve
//!                     ▼
//!               ┌──────────┐
//!               │  lookup   │  click → nearest identity / bin members
//!               └──────────┘
//! ```
//!
//! Nothing here reorders or re-keys values: every retained sample keeps its
//! [`RecordId`](crate::data::model::RecordId).

pub mod align;
pub mod density;
pub mod distribution;
pub mod histogram;
pub mod lookup;
pub mod stats;

pub use align::{align, Analysis, JointSample};
pub use histogram::{BinEdges, Histogram1D, Histogram2D, ValueRange};
pub use lookup::{nearest_point, AxisRange, PlottedPoint};
pub use stats::{LinearFit, Summary};
