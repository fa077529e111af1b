//! API middleware. Only the access log for now; it runs innermost.

pub mod access_log;
