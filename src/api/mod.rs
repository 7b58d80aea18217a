//! HTTP API over the state hub
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/api/health` | status, version, uptime |
//! | GET | `/api/all` | current job set |
//! | GET | `/api/upcoming` | current upcoming set |
//! | GET | `/api/scheduled` | current scheduled set |
//! | POST | `/api/schedulePlayout` | dispatch one job now, unpadded |

pub mod routes;
pub mod server;

pub use routes::{create_router, ErrorResponse, HealthResponse};
pub use server::{ApiServer, AppState, ServerError};
