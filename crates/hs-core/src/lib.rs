//! Hypersearch Core Library
//!
//! This crate provides the domain-rule evaluation engine for the
//! Hypersearch extension. It owns every decision the content script acts
//! on -- which rendered result is hidden, pinned, or left alone -- while
//! staying free of browser APIs so the whole engine runs under plain
//! `cargo test`.
//!
//! # Architecture
//!
//! A scan turns probed result containers into classified elements, splits
//! the configured rule set into its `[lazy, exact, override]` buckets, and
//! folds rule matches into at most one action per element. The DOM and
//! storage glue live in `hs-wasm`; native tooling lives in `hs-cli`.
//!
//! # Modules
//!
//! - `psl`: registrable-domain extraction and domain-input validation
//! - `url`: hostname derivation from anchor hrefs
//! - `matcher`: rule matching, partitioning and action resolution
//! - `classify`: result-probe classification
//! - `config`: the persisted record, mutation ops and store adapter
//! - `message`: cross-context message records
//! - `types`: shared type definitions

pub mod classify;
pub mod config;
pub mod matcher;
pub mod message;
pub mod psl;
pub mod types;
pub mod url;

// Re-export commonly used items
pub use classify::{classify, classify_all, ClassifySkip, ResultProbe};
pub use config::{load_or_default, migrate_legacy, Config, ConfigStore, Opts, StoreError};
pub use matcher::{matches, partition, resolve, Partition};
pub use message::Message;
pub use psl::{registrable_domain, validate_domain_input, DomainError};
pub use types::{Action, CardTypes, DomainRule, Resolution, ResultElement, ResultKind, VisualState};
