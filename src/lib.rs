//! HomeFax Client Library
//!
//! Client-side core of the HomeFax property-history marketplace: a uniform
//! API facade over either in-process fixtures or the live REST backend,
//! authentication and wallet onboarding, report purchase and viewing.
//!
//! # Modules
//!
//! - `api`: Request facade grouped into auth, properties, reports and blockchain.
//! - `async_state`: Loading/success/failure tracking with cancellation.
//! - `config`: Environment-driven configuration.
//! - `data_source`: Fixture and HTTP backends behind one trait.
//! - `errors`: Error types and context helpers.
//! - `fixtures`: Sample properties, reports and report bodies.
//! - `models`: Wire and domain types.
//! - `navigation`: Routes and navigation sink.
//! - `onboarding`: Email, social and wallet sign-in flows.
//! - `payment`: Simulated checkout producing payment payloads.
//! - `session`: Persistent key-value session storage.
//! - `views`: Property list and property detail orchestration.
//! - `wallet`: Smart wallet creation and basename registration.

pub mod api;
pub mod async_state;
pub mod config;
pub mod data_source;
pub mod errors;
pub mod fixtures;
pub mod models;
pub mod navigation;
pub mod onboarding;
pub mod payment;
pub mod session;
pub mod views;
pub mod wallet;
