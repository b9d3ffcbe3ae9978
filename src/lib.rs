#![doc = "kontent-source: projects a Kontent CMS content model into typed graph nodes."]

//! This crate contains the schema/content projection engine: it derives a
//! graph schema from a CMS project's content type definitions and
//! normalizes heterogeneous content items into canonical nodes with stable
//! identity and change-detection fingerprints.
//!
//! The CMS client and the host node store are collaborators behind the
//! traits in [`contract`]; concrete glue implementations live in
//! [`client`] (Delivery API) and [`host`] (in-memory store).
//!
//! # Usage
//! Run [`project::project`] with a [`contract::ContentClient`] and a
//! [`contract::GraphHost`]; or drive the two phases yourself with
//! [`project::project_types`] followed by [`project::project_items`].

pub mod cli;
pub mod client;
pub mod config;
pub mod contract;
pub mod host;
pub mod items;
pub mod load_config;
pub mod naming;
pub mod project;
pub mod schema;
pub mod value;
