//! # Register State
//!
//! The checkout state machine behind a mutex.
//!
//! ## Lock Discipline
//! The lock is never held across an `.await`. Commands copy what they need
//! out (a payload, a link, a token), release the lock, do I/O, and re-enter
//! with the token to apply the result.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use wt_core::{Register, UpiPayee};

/// Shared handle to the register.
#[derive(Debug, Clone)]
pub struct RegisterState {
    register: Arc<Mutex<Register>>,
}

impl RegisterState {
    /// Opens a register with an empty bill.
    pub fn new(payee: UpiPayee, now: DateTime<Utc>) -> Self {
        RegisterState {
            register: Arc::new(Mutex::new(Register::new(payee, now))),
        }
    }

    /// Executes a function with read access to the register.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = state.with_register(|r| r.cart().bill().totals().total);
    /// ```
    pub fn with_register<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Register) -> R,
    {
        let register = self.register.lock().unwrap_or_else(|e| e.into_inner());
        f(&register)
    }

    /// Executes a function with write access to the register.
    pub fn with_register_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Register) -> R,
    {
        let mut register = self.register.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut register)
    }
}
