//! actionsync core library: domain types, manifest loading, CI context, errors.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`ConfigError`]
//! - [`config`]: manifest load / validate / overrides
//! - [`ci`]: [`CiContext`] trait and the GitHub Actions environment reader

pub mod ci;
pub mod config;
pub mod error;
pub mod types;

pub use ci::{CiContext, EnvCiContext};
pub use error::ConfigError;
pub use types::{
    ActionInput, Branding, CandidateSet, DockerSettings, EnvVar, Identity, Manifest, SyncOutcome,
    SyncSettings, TriggerKind,
};
