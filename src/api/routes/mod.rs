//! API Routes
//!
//! Route handlers organized by functionality.

pub mod companies;
pub mod date_range;
pub mod health;
pub mod measurements;
