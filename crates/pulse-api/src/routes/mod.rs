//! # API Route Modules
//!
//! - `top`: `GET /top`, one scan-and-rank cycle per request.

pub mod top;
