//! # State Module
//!
//! Shared state for the console.
//!
//! ## Why Multiple State Types?
//! Each command takes only the state it needs, and the background QR task
//! holds nothing but a clone of [`RegisterState`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │  RegisterState   │  │  CatalogState    │  │  SessionState    │      │
//! │  │                  │  │                  │  │                  │      │
//! │  │  Arc<Mutex<      │  │  Arc<RwLock<     │  │  Arc<Mutex<      │      │
//! │  │    Register      │  │    products,     │  │    Option<       │      │
//! │  │  >>              │  │    last picks>>  │  │    Session>>>    │      │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • RegisterState: one writer at a time; QR task writes through it      │
//! │  • CatalogState: replaced wholesale on reload, read by search          │
//! │  • SessionState: set by login, cleared by logout                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod catalog;
mod register;
mod session;

pub use catalog::CatalogState;
pub use register::RegisterState;
pub use session::SessionState;
