//! Core transaction pipeline and its abstractions

pub mod analyzer;
pub mod config;
pub mod export;
pub mod log;
pub mod normalizer;
pub mod numeric;
pub mod paginator;
pub mod provider;
pub mod transaction;

// Re-export main types for cleaner imports
pub use analyzer::{AnalysisReport, EthereumTransactionAnalyzer, TransactionAnalyzer};
pub use export::{ExportSummary, TransactionExporter};
pub use provider::{PageQuery, PageSource, SortOrder, TransactionProvider};
pub use transaction::{CollectionResult, RawTransaction, TransactionCategory, UnifiedTransaction};
