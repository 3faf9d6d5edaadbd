//! LOS - Local Online Shops session core
//!
//! Authenticated request pipeline, session persistence, auth state and
//! role-based routing for the LOS storefront, plus the Leptos glue that
//! exposes them to the component tree.

pub mod core;
pub mod ui;
