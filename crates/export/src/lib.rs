//! Trimline Export
//!
//! Exports the current trim range. An inactive trim downloads the original
//! source directly. An active trim is submitted to a render service as a
//! time window; the dispatcher subscribes to the completion channel under a
//! fresh request id before submitting, waits for a terminal event under a
//! timeout, and downloads the signed result.
//!
//! ```text
//! dispatcher ──subscribe(id)──▶ CompletionChannel
//!      │                              ▲
//!      └──submit_trim(id)──▶ RenderService ──event(id)──┘
//! ```

pub mod dispatcher;
pub mod service;
pub mod subscription;

pub use dispatcher::*;
pub use service::*;
pub use subscription::*;
