// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::{
    Ledger, DEFAULT_APP_FUNDING_MICROALGOS, DEFAULT_CONFIRMATION_ROUNDS,
    DEFAULT_METHOD_CALL_FEE_MICROALGOS,
};

/// Amounts and limits applied by the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSettings {
    /// Paid into the application account before minting
    pub app_funding_microalgos: u64,
    /// Flat fee for contract calls
    pub method_call_fee_microalgos: u64,
    /// Rounds to wait for a payment to confirm
    pub confirmation_rounds: u64,
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            app_funding_microalgos: DEFAULT_APP_FUNDING_MICROALGOS,
            method_call_fee_microalgos: DEFAULT_METHOD_CALL_FEE_MICROALGOS,
            confirmation_rounds: DEFAULT_CONFIRMATION_ROUNDS,
        }
    }
}

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub settings: OperationSettings,
}

impl AppState {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            settings: OperationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: OperationSettings) -> Self {
        self.settings = settings;
        self
    }
}
