//! Application services: use-case implementations.
//!
//! Each service holds the [`HomeSource`](crate::ports::HomeSource) it talks to
//! and branches once on the [`Backing`](hkmirror_domain::backing::Backing) of
//! the objects it is given: live objects go through the source, detached ones
//! are updated in place.

pub mod characteristic_service;
pub mod home_service;
pub mod mirror_service;
