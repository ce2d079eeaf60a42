//! Static navigation and routing descriptors for the pages that present the
//! return calculations. Built once at start-up; nothing is discovered at
//! runtime.

pub mod navigation;
pub mod routes;
