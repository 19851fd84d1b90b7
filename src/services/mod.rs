//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the session state machine and the backend record
//! contract so route handlers can stay focused on cookies, forms and status
//! codes.

pub mod records;
pub mod session;
