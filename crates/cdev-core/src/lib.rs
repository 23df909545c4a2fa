//! Character Device Core - Pure Bounded-Buffer State
//!
//! This crate contains the **pure, HAL-free** state of a bounded-buffer
//! character device: a fixed-capacity byte buffer, an open counter, and the
//! read/write transfer logic that runs against a caller-held cursor.
//!
//! # Design Principles
//!
//! 1. **No HAL dependency**: registration, locking and diagnostics live in `cdev-driver`
//! 2. **No I/O or side effects**: every operation is a bounded memory copy
//! 3. **Caller-held cursor**: the device never stores a position
//! 4. **Verifiable**: small enough for Kani proofs and loom models
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        cdev-core                            │
//! │                                                             │
//! │   ┌───────────────┐    ┌───────────────────────────┐        │
//! │   │  DeviceState  │    │  read / read_into / write │        │
//! │   │  - buffer     │───▶│  clamp to capacity - pos  │        │
//! │   │  - open_count │    │  zero-fill before write   │        │
//! │   └───────────────┘    └───────────────────────────┘        │
//! │                                                             │
//! │   ┌───────────────┐                                         │
//! │   │  Invariants   │                                         │
//! │   └───────────────┘                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              │ used by
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       cdev-driver                           │
//! │   - host registration with rollback                         │
//! │   - session handles, device lock, debug output              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Verification Strategy
//!
//! - **Kani proofs**: transfers never leave the buffer, cursors stay in range
//! - **Loom tests**: a locked reader never observes a half-finished write

#![no_std]
extern crate alloc;

pub mod invariants;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "loom"))]
mod loom_tests;

pub use invariants::{check_all_invariants, check_transfer, InvariantViolation};
pub use state::DeviceState;
pub use types::{
    clamp_len, DeviceError, ReadOutcome, Transfer, BUFFER_PAGES, DEFAULT_CAPACITY, PAGE_SIZE,
};
