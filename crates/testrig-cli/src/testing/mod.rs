//! Test execution and reporting for testrig
//!
//! An [`Engine`](engine::Engine) executes tests and feeds each outcome to a
//! [`Reporter`](reporter::Reporter), which renders progress and the final
//! report.

pub mod discovery;
pub mod dotprogress;
pub mod engine;
pub mod outcome;
pub mod process;
pub mod reporter;
pub mod tap;

pub use process::ProcessEngine;
