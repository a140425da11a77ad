//! Derived-metrics core for the Spazio space-rental marketplace
//!
//! Computes owner revenue/occupancy metrics, rating averages and score
//! distributions, and top-rated-space rankings from the rental and assessment
//! ledgers, fronted by a TTL cache with pattern-based invalidation. Also owns
//! the recurring-reservation expander that turns one booking request into a
//! deterministic series of rental instances.

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod facade;
pub mod ledger;

pub use config::MetricsConfig;
pub use error::{MetricsError, Result};
pub use facade::{AssessmentView, MetricsFacade, Paginated, Requester};
