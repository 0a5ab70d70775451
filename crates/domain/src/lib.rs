//! # hkmirror-domain
//!
//! Pure domain model mirroring a platform home-automation API.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Closed wire enumerations for characteristic, service and accessory kinds
//! - Define **Characteristics** (observable attributes with a weakly typed value)
//! - Define **Services** (capability bundles hosting characteristics)
//! - Define **Accessories**, **Rooms**, **Zones** and **Homes**
//! - Define **Action sets** (scenes), **Triggers** and **Service groups**
//! - Tag every mirrored object as live-backed or detached ([`backing`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod backing;
pub mod category;
pub mod error;
pub mod id;
pub mod naming;
pub mod time;

pub mod accessory;
pub mod action_set;
pub mod characteristic;
pub mod home;
pub mod room;
pub mod service;
pub mod service_group;
pub mod trigger;
pub mod zone;
