//! Settlement Ledger
//!
//! Owns every user's per-asset custodied balance, accepts deposits, and runs
//! batched convert-and-distribute settlements.
//!
//! ## Settlement
//!
//! 1. Tally each user's balance of the asset and zero it immediately
//! 2. Exit early if the tallied pool is empty
//! 3. Snapshot the ledger's destination-asset holdings
//! 4. Grant the executor exactly the declared amount, call it, then restore
//!    whatever grant was outstanding before
//! 5. Measure what arrived as a balance delta
//! 6. Pay each user floor(received * share / total); the remainder stays as dust
//!
//! Zeroing before the exchange call means a settlement re-entered from the
//! executor tallies nothing for users already in the outer batch.
//!
//! ## Atomicity
//!
//! Every entry point runs in a scope. On error, balances, the settlement
//! counter, events and the transfer service are all restored to where the
//! call found them.

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use pooled_settlement_common::{
    check,
    constants::{limits::MAX_DEPOSIT_ENTRIES, NATIVE_ASSET, SETTLEMENT_ID_DOMAIN},
    errors::{LedgerError, LedgerResult},
    events::{EventLog, LedgerEvent},
    math::{safe_add, split_pro_rata},
    ports::{AssetTransferService, ExchangeCall, TransferFailure},
    types::{
        is_native, Address, AssetId, CallContext, LedgerAction, Payout, Quantity, SettlementId,
        SettlementReceipt,
    },
    validation::{require_batch_size, require_equal_lengths},
    Vec,
};

use crate::config::{DeclaredAmountPolicy, LedgerConfig};
use crate::executor::ExchangeExecutor;
use crate::journal::{Journal, JournalEntry};

/// Result of dispatching a `LedgerAction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A deposit was recorded
    Deposited,
    /// A settlement ran (possibly as an empty-pool no-op)
    Settled(SettlementReceipt),
}

/// The pooled settlement ledger
#[derive(Debug, Clone)]
pub struct SettlementLedger {
    config: LedgerConfig,
    balances: BTreeMap<(Address, AssetId), Quantity>,
    settlement_nonce: u64,
    events: EventLog,
    journal: Journal,
}

impl SettlementLedger {
    /// Create an empty ledger
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            balances: BTreeMap::new(),
            settlement_nonce: 0,
            events: EventLog::new(),
            journal: Journal::default(),
        }
    }

    // ============ Queries ============

    /// Ledger configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// UserBalance[user][asset]
    pub fn balance_of(&self, user: &Address, asset: &AssetId) -> Quantity {
        self.balances.get(&(*user, *asset)).copied().unwrap_or(0)
    }

    /// Sum of every user's recorded balance of `asset`
    pub fn total_custodied(&self, asset: &AssetId) -> u128 {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, &q)| q as u128)
            .sum()
    }

    /// Number of non-empty settlements executed so far
    pub fn settlement_nonce(&self) -> u64 {
        self.settlement_nonce
    }

    /// Events emitted by committed calls
    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    /// Take all events emitted so far
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        self.events.drain()
    }

    // ============ Entry Points ============

    /// Deposit `amounts[i]` of `tokens[i]` on the caller's behalf.
    ///
    /// Native entries are paid out of `ctx.value`; all others are pulled
    /// from the caller, who must have approved the ledger beforehand.
    ///
    /// # Errors
    /// `LengthMismatch`, `BatchTooLarge`, `InsufficientNativeValue`,
    /// `TransferFailed`, `Overflow`. On any error nothing is deposited.
    pub fn deposit<A: AssetTransferService>(
        &mut self,
        ctx: &CallContext,
        tokens: &[AssetId],
        amounts: &[Quantity],
        assets: &mut A,
    ) -> LedgerResult<()> {
        self.atomically(assets, |ledger, assets| ledger.deposit_inner(ctx, tokens, amounts, assets))
    }

    /// Convert the pooled `asset` of `users` into the destination asset and
    /// pay the proceeds out pro rata.
    ///
    /// Returns an empty receipt, without calling the executor, when every
    /// listed user holds zero of `asset`.
    ///
    /// # Errors
    /// `Unauthorized`, `InvalidAddress`, `BatchTooLarge`,
    /// `DeclaredAmountMismatch`, `TransferFailed`, `ExecutorCallFailed`,
    /// `DestinationBalanceDecreased`, `Overflow`. On any error every balance
    /// is left exactly as it was before the call.
    #[allow(clippy::too_many_arguments)]
    pub fn settle<A, X>(
        &mut self,
        ctx: &CallContext,
        users: &[Address],
        asset: &AssetId,
        declared_amount: Quantity,
        instruction: &[u8],
        assets: &mut A,
        executor: &mut X,
    ) -> LedgerResult<SettlementReceipt>
    where
        A: AssetTransferService,
        X: ExchangeExecutor<A>,
    {
        self.atomically(assets, |ledger, assets| {
            ledger.settle_inner(ctx, users, asset, declared_amount, instruction, assets, executor)
        })
    }

    /// Route a decoded action to its entry point
    pub fn dispatch<A, X>(
        &mut self,
        ctx: &CallContext,
        action: &LedgerAction,
        assets: &mut A,
        executor: &mut X,
    ) -> LedgerResult<DispatchOutcome>
    where
        A: AssetTransferService,
        X: ExchangeExecutor<A>,
    {
        match action {
            LedgerAction::Deposit { tokens, amounts } => {
                self.deposit(ctx, tokens, amounts, assets)?;
                Ok(DispatchOutcome::Deposited)
            }
            LedgerAction::Settle { users, asset, declared_amount, instruction } => {
                let receipt =
                    self.settle(ctx, users, asset, *declared_amount, instruction, assets, executor)?;
                Ok(DispatchOutcome::Settled(receipt))
            }
        }
    }

    /// Decode a CBOR-encoded action and dispatch it
    pub fn dispatch_cbor<A, X>(
        &mut self,
        ctx: &CallContext,
        encoded: &[u8],
        assets: &mut A,
        executor: &mut X,
    ) -> LedgerResult<DispatchOutcome>
    where
        A: AssetTransferService,
        X: ExchangeExecutor<A>,
    {
        let action = LedgerAction::from_cbor(encoded)?;
        self.dispatch(ctx, &action, assets, executor)
    }

    // ============ Deposit ============

    fn deposit_inner<A: AssetTransferService>(
        &mut self,
        ctx: &CallContext,
        tokens: &[AssetId],
        amounts: &[Quantity],
        assets: &mut A,
    ) -> LedgerResult<()> {
        require_equal_lengths(tokens.len(), amounts.len())?;
        require_batch_size(tokens.len(), MAX_DEPOSIT_ENTRIES)?;

        self.accept_call_value(ctx, assets)?;

        let ledger = self.config.ledger_address;
        let mut native_required: Quantity = 0;

        for (token, &amount) in tokens.iter().zip(amounts) {
            if is_native(token) {
                native_required = safe_add(native_required, amount)?;
                check!(
                    native_required <= ctx.value,
                    LedgerError::InsufficientNativeValue {
                        attached: ctx.value,
                        required: native_required,
                    }
                );
            } else {
                assets
                    .pull(token, &ledger, &ctx.caller, &ledger, amount)
                    .map_err(|reason| transfer_failed(token, &ctx.caller, &ledger, amount, reason))?;
            }

            self.credit(&ctx.caller, token, amount)?;
        }

        self.events.emit(LedgerEvent::Deposited {
            user: ctx.caller,
            tokens: tokens.to_vec(),
            amounts: amounts.to_vec(),
        });

        debug!(entries = tokens.len(), native = native_required, "deposit recorded");
        Ok(())
    }

    /// Native value arrives with the call: move it into custody up front
    fn accept_call_value<A: AssetTransferService>(
        &mut self,
        ctx: &CallContext,
        assets: &mut A,
    ) -> LedgerResult<()> {
        if ctx.value == 0 {
            return Ok(());
        }
        let ledger = self.config.ledger_address;
        assets
            .push(&NATIVE_ASSET, &ctx.caller, &ledger, ctx.value)
            .map_err(|reason| transfer_failed(&NATIVE_ASSET, &ctx.caller, &ledger, ctx.value, reason))
    }

    // ============ Settlement ============

    #[allow(clippy::too_many_arguments)]
    fn settle_inner<A, X>(
        &mut self,
        ctx: &CallContext,
        users: &[Address],
        asset: &AssetId,
        declared_amount: Quantity,
        instruction: &[u8],
        assets: &mut A,
        executor: &mut X,
    ) -> LedgerResult<SettlementReceipt>
    where
        A: AssetTransferService,
        X: ExchangeExecutor<A>,
    {
        check!(
            self.config.settle_access.permits(&ctx.caller),
            LedgerError::Unauthorized { caller: ctx.caller }
        );
        check!(
            executor.address() == self.config.exchange_executor,
            LedgerError::InvalidAddress {
                reason: "executor does not match configured exchange executor",
            }
        );
        check!(
            ctx.value == 0,
            LedgerError::InvalidInput { param: "value", reason: "settle does not accept native value" }
        );
        require_batch_size(users.len(), self.config.max_batch_users)?;

        // 1. Tally and zero in one pass; a duplicate user tallies zero
        let mut shares = Vec::with_capacity(users.len());
        let mut total: Quantity = 0;
        for user in users {
            let share = self.take_balance(user, asset);
            total = safe_add(total, share)?;
            shares.push(share);
        }

        // 2. Nothing pooled, nothing to convert
        if total == 0 {
            debug!(users = users.len(), "settlement skipped: empty pool");
            return Ok(SettlementReceipt::empty(*asset));
        }

        let stranded = match self.config.declared_amount_policy {
            DeclaredAmountPolicy::RequireExact => {
                check!(
                    declared_amount == total,
                    LedgerError::DeclaredAmountMismatch { declared: declared_amount, tallied: total }
                );
                0
            }
            DeclaredAmountPolicy::AllowPartial => {
                // Never convert more than the batch owns
                check!(
                    declared_amount <= total,
                    LedgerError::DeclaredAmountMismatch { declared: declared_amount, tallied: total }
                );
                if declared_amount != total {
                    warn!(declared = declared_amount, tallied = total, "declared amount differs from pool");
                }
                total - declared_amount
            }
        };

        let ledger = self.config.ledger_address;
        let destination = self.config.destination_asset;
        let executor_address = self.config.exchange_executor;

        let nonce = self.bump_nonce()?;
        let settlement_id = derive_settlement_id(&ledger, nonce, asset, declared_amount, users);

        debug!(users = users.len(), total, declared = declared_amount, nonce, "settlement tallied");

        // 3. Snapshot
        let before = assets.balance_of(&destination, &ledger);

        // 4. Conversion under a bounded grant. A settlement re-entered from the
        // executor finds the outer grant in place and hands it back afterwards.
        let prior_grant = assets.allowance(asset, &ledger, &executor_address);
        let value = if is_native(asset) {
            assets
                .push(asset, &ledger, &executor_address, declared_amount)
                .map_err(|reason| transfer_failed(asset, &ledger, &executor_address, declared_amount, reason))?;
            declared_amount
        } else {
            assets
                .approve(asset, &ledger, &executor_address, declared_amount)
                .map_err(|reason| transfer_failed(asset, &ledger, &executor_address, declared_amount, reason))?;
            0
        };

        let call = ExchangeCall {
            ledger,
            asset: *asset,
            destination,
            amount: declared_amount,
            value,
            instruction,
        };
        executor
            .execute(&call, self, assets)
            .map_err(|fault| LedgerError::ExecutorCallFailed { executor: executor_address, fault })?;

        if !is_native(asset) {
            assets
                .approve(asset, &ledger, &executor_address, prior_grant)
                .map_err(|reason| transfer_failed(asset, &ledger, &executor_address, prior_grant, reason))?;
        }

        // 5. Trust only the observable delta
        let after = assets.balance_of(&destination, &ledger);
        let received = after
            .checked_sub(before)
            .ok_or(LedgerError::DestinationBalanceDecreased { before, after })?;

        // 6. Pro-rata payout in tally order
        let (cuts, dust) = split_pro_rata(received, &shares)?;
        let mut payouts = Vec::with_capacity(users.len());
        let mut distributed: Quantity = 0;

        for ((user, &share), &amount) in users.iter().zip(&shares).zip(&cuts) {
            assets
                .push(&destination, &ledger, user, amount)
                .map_err(|reason| transfer_failed(&destination, &ledger, user, amount, reason))?;

            self.events.emit(LedgerEvent::Distributed {
                settlement_id,
                user: *user,
                asset: *asset,
                share,
                amount,
            });

            distributed = safe_add(distributed, amount)?;
            payouts.push(Payout { user: *user, share, amount });
        }

        let batch_size = u32::try_from(users.len()).map_err(|_| LedgerError::Overflow)?;
        self.events.emit(LedgerEvent::SettlementExecuted {
            settlement_id,
            asset: *asset,
            declared_amount,
            tallied_total: total,
            received,
            distributed,
            dust,
            users: batch_size,
        });

        debug!(received, distributed, dust, stranded, "settlement distributed");

        Ok(SettlementReceipt {
            settlement_id,
            asset: *asset,
            tallied_total: total,
            declared_amount,
            received,
            distributed,
            dust,
            stranded,
            payouts,
        })
    }

    // ============ State Mutation ============

    fn credit(&mut self, user: &Address, asset: &AssetId, amount: Quantity) -> LedgerResult<()> {
        let current = self.balance_of(user, asset);
        let updated = safe_add(current, amount)?;
        self.write_balance(user, asset, updated);
        Ok(())
    }

    /// Read a balance and reset it to zero
    fn take_balance(&mut self, user: &Address, asset: &AssetId) -> Quantity {
        let current = self.balance_of(user, asset);
        if current > 0 {
            self.write_balance(user, asset, 0);
        }
        current
    }

    fn write_balance(&mut self, user: &Address, asset: &AssetId, amount: Quantity) {
        let previous = self.balance_of(user, asset);
        self.journal.record(JournalEntry::Balance { user: *user, asset: *asset, previous });
        if amount == 0 {
            self.balances.remove(&(*user, *asset));
        } else {
            self.balances.insert((*user, *asset), amount);
        }
    }

    fn bump_nonce(&mut self) -> LedgerResult<u64> {
        let nonce = self.settlement_nonce;
        self.journal.record(JournalEntry::Nonce { previous: nonce });
        self.settlement_nonce = nonce.checked_add(1).ok_or(LedgerError::Overflow)?;
        Ok(nonce)
    }

    // ============ All-or-nothing ============

    fn atomically<A, T, F>(&mut self, assets: &mut A, op: F) -> LedgerResult<T>
    where
        A: AssetTransferService,
        F: FnOnce(&mut Self, &mut A) -> LedgerResult<T>,
    {
        let checkpoint = assets.checkpoint();
        let journal_mark = self.journal.open();
        let event_mark = self.events.len();

        match op(self, assets) {
            Ok(value) => {
                self.journal.commit();
                assets.commit(checkpoint);
                Ok(value)
            }
            Err(err) => {
                while let Some(entry) = self.journal.pop_above(journal_mark) {
                    self.undo(entry);
                }
                self.journal.abandon();
                self.events.truncate(event_mark);
                assets.rollback(checkpoint);

                warn!(code = err.code(), "ledger call aborted");
                Err(err)
            }
        }
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Balance { user, asset, previous } => {
                if previous == 0 {
                    self.balances.remove(&(user, asset));
                } else {
                    self.balances.insert((user, asset), previous);
                }
            }
            JournalEntry::Nonce { previous } => {
                self.settlement_nonce = previous;
            }
        }
    }
}

fn transfer_failed(
    asset: &AssetId,
    from: &Address,
    to: &Address,
    amount: Quantity,
    reason: TransferFailure,
) -> LedgerError {
    LedgerError::TransferFailed { asset: *asset, from: *from, to: *to, amount, reason }
}

/// Deterministic settlement identifier
///
/// SHA-256 over a domain tag, the ledger address, the settlement nonce, the
/// asset, the declared amount, and every user in batch order.
pub fn derive_settlement_id(
    ledger: &Address,
    nonce: u64,
    asset: &AssetId,
    declared_amount: Quantity,
    users: &[Address],
) -> SettlementId {
    let mut hasher = Sha256::new();
    hasher.update(SETTLEMENT_ID_DOMAIN);
    hasher.update(ledger);
    hasher.update(nonce.to_le_bytes());
    hasher.update(asset);
    hasher.update(declared_amount.to_le_bytes());
    for user in users {
        hasher.update(user);
    }
    let result = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&result);
    id
}
