//! Drive folder walker
//!
//! This module implements a sequential, worklist-driven walk over a Drive
//! folder tree.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │       Worklist          │
//!                     │  - LIFO stack           │
//!                     │  - visited at pop time  │
//!                     └───────────┬─────────────┘
//!                                 │ (folder id, path)
//!                     ┌───────────▼─────────────┐
//!                     │       Traverser         │
//!                     │  - all pages per folder │
//!                     │  - fixed pause          │
//!                     └─────┬─────────────┬─────┘
//!                 subfolder │             │ file
//!                  (re-push)│             ▼
//!                           │   ┌──────────────────┐
//!                           │   │ permissions      │
//!                           │   │ owner / writers  │
//!                           │   └────────┬─────────┘
//!                           │            ▼
//!                           │   ┌──────────────────┐
//!                           │   │    Inventory     │
//!                           │   └──────────────────┘
//! ```

pub mod inventory;
pub mod traverser;
pub mod worklist;

pub use inventory::{FileRecord, Inventory, REPORT_COLUMNS};
pub use traverser::{Traverser, WalkProgress, WalkResult, WalkStats, DEFAULT_REQUEST_DELAY};
pub use worklist::{Worklist, WorklistEntry};
