// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger operations used by the HTTP handlers.
//!
//! Handlers only see the [`Ledger`] trait. [`AlgorandLedger`] implements it
//! on top of an algod node: it builds transactions, signs them with the
//! caller's account, submits them and waits for confirmation.

use std::sync::Arc;

use async_trait::async_trait;

use super::address::Address;
use super::app_spec::AppSpec;
use super::client::{AlgodClient, LedgerError, ResourcesAccessed};
use super::signing::Account;
use super::transaction::{ApplicationCall, BoxReference, Transaction, TransactionKind};
use super::types::{CreatedApplication, MethodCall, MethodCallResult, PendingTransaction};

/// Bare create call invoked when deploying the contract.
pub const CREATE_METHOD: &str = "createApplication()void";

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Deploy the contract described by the application specification.
    async fn create_application(&self, sender: &Account)
        -> Result<CreatedApplication, LedgerError>;

    /// Pay `amount` microalgos into the application's account.
    async fn fund_app_account(
        &self,
        sender: &Account,
        app_id: u64,
        amount: u64,
    ) -> Result<String, LedgerError>;

    /// Invoke an ABI method and wait for its result.
    async fn call_method(
        &self,
        sender: &Account,
        app_id: u64,
        call: MethodCall,
    ) -> Result<MethodCallResult, LedgerError>;

    async fn asset_opt_in(&self, account: &Account, asset_id: u64) -> Result<String, LedgerError>;

    /// Build, sign and submit a payment. Does not wait for confirmation.
    async fn send_payment(
        &self,
        sender: &Account,
        receiver: &Address,
        amount: u64,
    ) -> Result<String, LedgerError>;

    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransaction, LedgerError>;
}

/// Tuning knobs for [`AlgorandLedger`].
#[derive(Debug, Clone, Copy)]
pub struct LedgerSettings {
    pub confirmation_rounds: u64,
    /// Simulate application calls to fill in their reference arrays
    pub populate_resources: bool,
}

/// [`Ledger`] backed by an algod node.
pub struct AlgorandLedger {
    client: AlgodClient,
    app_spec: Arc<AppSpec>,
    settings: LedgerSettings,
}

impl AlgorandLedger {
    pub fn new(client: AlgodClient, app_spec: Arc<AppSpec>, settings: LedgerSettings) -> Self {
        Self {
            client,
            app_spec,
            settings,
        }
    }

    /// Sign, submit and wait for the transaction to be confirmed.
    async fn submit_and_confirm(
        &self,
        account: &Account,
        transaction: Transaction,
    ) -> Result<(String, PendingTransaction), LedgerError> {
        let signed = account.sign(transaction);
        let tx_id = self.client.send_raw_transaction(&[signed]).await?;
        tracing::debug!(tx_id = %tx_id, "Transaction submitted");

        let pending = self
            .client
            .wait_for_confirmation(&tx_id, self.settings.confirmation_rounds)
            .await?;
        tracing::debug!(
            tx_id = %tx_id,
            round = ?pending.confirmed_round,
            "Transaction confirmed"
        );
        Ok((tx_id, pending))
    }

    /// Add the references a simulation reports to an application call.
    /// A failed simulation leaves the call unchanged.
    async fn populate_resources(&self, transaction: Transaction) -> Transaction {
        let resources = match self
            .client
            .simulate_resources(&[transaction.clone().unsigned()])
            .await
        {
            Ok(resources) => resources,
            Err(e) => {
                tracing::warn!(error = %e, "Resource population skipped");
                return transaction;
            }
        };

        let mut transaction = transaction;
        if let TransactionKind::ApplicationCall(call) = &mut transaction.kind {
            merge_resources(call, transaction.sender, resources);
        }
        transaction
    }
}

/// Most accounts one application call may reference.
const MAX_ACCOUNT_REFERENCES: usize = 4;
/// Most accounts, assets, apps and boxes one application call may reference.
const MAX_TOTAL_REFERENCES: usize = 8;

fn merge_resources(call: &mut ApplicationCall, sender: Address, resources: ResourcesAccessed) {
    let total = |call: &ApplicationCall| {
        call.accounts.len() + call.foreign_assets.len() + call.foreign_apps.len() + call.boxes.len()
    };
    let mut skipped = 0usize;

    for account in resources.accounts {
        if account == sender || call.accounts.contains(&account) {
            continue;
        }
        if call.accounts.len() < MAX_ACCOUNT_REFERENCES && total(call) < MAX_TOTAL_REFERENCES {
            call.accounts.push(account);
        } else {
            skipped += 1;
        }
    }
    for asset in resources.assets {
        if call.foreign_assets.contains(&asset) {
            continue;
        }
        if total(call) < MAX_TOTAL_REFERENCES {
            call.foreign_assets.push(asset);
        } else {
            skipped += 1;
        }
    }
    for app in resources.apps {
        if app == call.app_id || call.foreign_apps.contains(&app) {
            continue;
        }
        if total(call) < MAX_TOTAL_REFERENCES {
            call.foreign_apps.push(app);
        } else {
            skipped += 1;
        }
    }
    for (app, name) in resources.boxes {
        let known = app == call.app_id || app == 0 || call.foreign_apps.contains(&app);
        // A box of an unreferenced app costs a second slot for the app itself.
        let needed = if known { 1 } else { 2 };
        if total(call) + needed > MAX_TOTAL_REFERENCES {
            skipped += 1;
            continue;
        }

        let app_index = if app == call.app_id || app == 0 {
            0
        } else {
            match call.foreign_apps.iter().position(|&id| id == app) {
                Some(position) => position as u64 + 1,
                None => {
                    call.foreign_apps.push(app);
                    call.foreign_apps.len() as u64
                }
            }
        };
        let reference = BoxReference { app_index, name };
        if !call.boxes.contains(&reference) {
            call.boxes.push(reference);
        }
    }

    if skipped > 0 {
        tracing::warn!(
            app_id = call.app_id,
            skipped,
            "Simulation reported more resources than one call can reference"
        );
    }
}

#[async_trait]
impl Ledger for AlgorandLedger {
    async fn create_application(
        &self,
        sender: &Account,
    ) -> Result<CreatedApplication, LedgerError> {
        let approval_program = self
            .client
            .compile_teal(self.app_spec.approval_source()?)
            .await?;
        let clear_program = self.client.compile_teal(self.app_spec.clear_source()?).await?;

        let args = if self.app_spec.signatures().any(|s| s == CREATE_METHOD) {
            self.app_spec.method(CREATE_METHOD)?.encode_app_args(&[])?
        } else {
            Vec::new()
        };

        let call = ApplicationCall {
            args,
            extra_pages: ApplicationCall::extra_pages_for(&approval_program, &clear_program),
            approval_program,
            clear_program,
            global_schema: self.app_spec.global_schema(),
            local_schema: self.app_spec.local_schema(),
            ..Default::default()
        };

        let params = self.client.suggested_params().await?;
        let transaction =
            Transaction::application_call(sender.address(), call, &params).with_fee(&params, None);

        let (tx_id, pending) = self.submit_and_confirm(sender, transaction).await?;
        let app_id = pending
            .application_index
            .ok_or_else(|| LedgerError::InvalidResponse("missing application-index".into()))?;

        tracing::info!(
            app_id,
            contract = self.app_spec.contract_name(),
            "Application created"
        );

        Ok(CreatedApplication {
            app_id,
            app_address: Address::for_application(app_id),
            tx_id,
        })
    }

    async fn fund_app_account(
        &self,
        sender: &Account,
        app_id: u64,
        amount: u64,
    ) -> Result<String, LedgerError> {
        let params = self.client.suggested_params().await?;
        let transaction = Transaction::payment(
            sender.address(),
            Address::for_application(app_id),
            amount,
            &params,
        )
        .with_fee(&params, None);

        let (tx_id, _) = self.submit_and_confirm(sender, transaction).await?;
        Ok(tx_id)
    }

    async fn call_method(
        &self,
        sender: &Account,
        app_id: u64,
        call: MethodCall,
    ) -> Result<MethodCallResult, LedgerError> {
        let method = self.app_spec.method(&call.signature)?;
        let args = method.encode_app_args(&call.args)?;

        let params = self.client.suggested_params().await?;
        let app_call = ApplicationCall {
            app_id,
            args,
            ..Default::default()
        };
        let mut transaction = Transaction::application_call(sender.address(), app_call, &params)
            .with_fee(&params, call.fee);

        if self.settings.populate_resources {
            transaction = self
                .populate_resources(transaction)
                .await
                .with_fee(&params, call.fee);
        }

        let (tx_id, pending) = self.submit_and_confirm(sender, transaction).await?;
        let return_value = method.decode_return(&pending.logs)?;

        Ok(MethodCallResult {
            tx_id,
            confirmed_round: pending.confirmed_round.unwrap_or_default(),
            return_value,
        })
    }

    async fn asset_opt_in(&self, account: &Account, asset_id: u64) -> Result<String, LedgerError> {
        let params = self.client.suggested_params().await?;
        let transaction =
            Transaction::asset_opt_in(account.address(), asset_id, &params).with_fee(&params, None);

        let (tx_id, _) = self.submit_and_confirm(account, transaction).await?;
        Ok(tx_id)
    }

    async fn send_payment(
        &self,
        sender: &Account,
        receiver: &Address,
        amount: u64,
    ) -> Result<String, LedgerError> {
        let params = self.client.suggested_params().await?;
        let transaction = Transaction::payment(sender.address(), *receiver, amount, &params)
            .with_fee(&params, None);

        self.client
            .send_raw_transaction(&[sender.sign(transaction)])
            .await
    }

    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransaction, LedgerError> {
        self.client.wait_for_confirmation(tx_id, max_rounds).await
    }
}

/// Recording [`Ledger`] for handler tests.
#[cfg(test)]
pub(crate) mod stub {
    use std::sync::Mutex;

    use super::*;
    use crate::blockchain::abi::AbiValue;

    pub(crate) const STUB_APP_ID: u64 = 1001;
    pub(crate) const STUB_ASSET_ID: u64 = 2002;

    #[derive(Default)]
    pub(crate) struct StubLedger {
        calls: Mutex<Vec<String>>,
        method_args: Mutex<Vec<Vec<AbiValue>>>,
        failing: bool,
    }

    impl StubLedger {
        /// A ledger whose every operation fails.
        pub(crate) fn failing() -> Self {
            Self {
                failing: true,
                ..Default::default()
            }
        }

        /// Operations performed so far, in order.
        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Arguments of each `call_method`, in order.
        pub(crate) fn method_args(&self) -> Vec<Vec<AbiValue>> {
            self.method_args.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<String, LedgerError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            if self.failing {
                return Err(LedgerError::Node {
                    status: 400,
                    message: "transaction rejected".into(),
                });
            }
            Ok(format!("TX{}", calls.len()))
        }
    }

    #[async_trait]
    impl Ledger for StubLedger {
        async fn create_application(
            &self,
            sender: &Account,
        ) -> Result<CreatedApplication, LedgerError> {
            let tx_id = self.record(format!("create_application {}", sender.address()))?;
            Ok(CreatedApplication {
                app_id: STUB_APP_ID,
                app_address: Address::for_application(STUB_APP_ID),
                tx_id,
            })
        }

        async fn fund_app_account(
            &self,
            _sender: &Account,
            app_id: u64,
            amount: u64,
        ) -> Result<String, LedgerError> {
            self.record(format!("fund_app_account {app_id} {amount}"))
        }

        async fn call_method(
            &self,
            _sender: &Account,
            app_id: u64,
            call: MethodCall,
        ) -> Result<MethodCallResult, LedgerError> {
            self.method_args.lock().unwrap().push(call.args.clone());
            let tx_id = self.record(format!(
                "call_method {app_id} {} fee={:?}",
                call.signature, call.fee
            ))?;
            let return_value = call
                .signature
                .ends_with("uint64")
                .then_some(AbiValue::Uint(STUB_ASSET_ID));
            Ok(MethodCallResult {
                tx_id,
                confirmed_round: 1,
                return_value,
            })
        }

        async fn asset_opt_in(
            &self,
            account: &Account,
            asset_id: u64,
        ) -> Result<String, LedgerError> {
            self.record(format!("asset_opt_in {} {asset_id}", account.address()))
        }

        async fn send_payment(
            &self,
            _sender: &Account,
            receiver: &Address,
            amount: u64,
        ) -> Result<String, LedgerError> {
            self.record(format!("send_payment {receiver} {amount}"))
        }

        async fn wait_for_confirmation(
            &self,
            tx_id: &str,
            max_rounds: u64,
        ) -> Result<PendingTransaction, LedgerError> {
            self.record(format!("wait_for_confirmation {tx_id} {max_rounds}"))?;
            Ok(PendingTransaction {
                confirmed_round: Some(1),
                ..Default::default()
            })
        }
    }
}
