//! Test fixtures: identities, a funded `AssetBook`, and a scripted executor.

use pooled_settlement_common::{
    is_native, Address, AssetBook, AssetId, AssetTransferService, CallContext, ExchangeCall,
    ExecutorFault, Quantity, SettlementReceipt,
};

use crate::config::LedgerConfig;
use crate::executor::ExchangeExecutor;
use crate::ledger::SettlementLedger;

pub const LEDGER: Address = [10u8; 32];
pub const USD: AssetId = [20u8; 32];
pub const ROUTER: Address = [30u8; 32];
pub const TOKEN_X: AssetId = [7u8; 32];
pub const TOKEN_Y: AssetId = [8u8; 32];

pub fn alice() -> Address {
    [2u8; 32]
}

pub fn bob() -> Address {
    [3u8; 32]
}

pub fn carol() -> Address {
    [4u8; 32]
}

pub fn operator() -> Address {
    [5u8; 32]
}

pub fn config() -> LedgerConfig {
    LedgerConfig::new(LEDGER, USD, ROUTER).unwrap()
}

pub fn setup() -> (SettlementLedger, AssetBook) {
    (SettlementLedger::new(config()), AssetBook::new())
}

/// Mint `amount` to `user` and approve the ledger to pull all of it
pub fn fund(book: &mut AssetBook, user: &Address, token: &AssetId, amount: Quantity) {
    book.mint(token, user, amount).unwrap();
    if !is_native(token) {
        let allowed = book.allowance(token, user, &LEDGER);
        book.approve(token, user, &LEDGER, allowed + amount).unwrap();
    }
}

/// Fund `user` and deposit `amount` of `token` on their behalf
pub fn deposit(
    ledger: &mut SettlementLedger,
    book: &mut AssetBook,
    user: &Address,
    token: &AssetId,
    amount: Quantity,
) {
    fund(book, user, token, amount);
    let ctx = if is_native(token) {
        CallContext::with_value(*user, amount)
    } else {
        CallContext::new(*user)
    };
    ledger.deposit(&ctx, &[*token], &[amount], book).unwrap();
}

/// What the executor does when called
#[derive(Debug, Clone)]
pub enum Script {
    /// Consume the input and mint `amount * numerator / denominator` of the
    /// destination asset to the ledger
    Convert { numerator: u64, denominator: u64 },
    /// Consume the input, deliver a fixed quantity
    Deliver(Quantity),
    /// Deliver a fixed quantity without consuming any input
    Gift(Quantity),
    /// Fail without touching anything
    Revert,
    /// Consume the input, then move `amount` of the destination asset out of
    /// the ledger
    Drain(Quantity),
    /// Re-enter `settle` for `users`, then convert 1:1
    Resettle { users: Vec<Address> },
    /// Re-enter `deposit` as the executor, then convert 1:1
    Redeposit { token: AssetId, amount: Quantity },
}

/// One observed executor call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCall {
    pub asset: AssetId,
    pub amount: Quantity,
    pub value: Quantity,
    pub allowance: Quantity,
    pub instruction: Vec<u8>,
}

/// Executor driven by a `Script`, recording every call it receives
#[derive(Debug, Clone)]
pub struct ScriptedExecutor {
    pub address: Address,
    pub script: Script,
    pub calls: Vec<ObservedCall>,
    pub inner_receipts: Vec<SettlementReceipt>,
}

impl ScriptedExecutor {
    pub fn new(script: Script) -> Self {
        Self { address: ROUTER, script, calls: Vec::new(), inner_receipts: Vec::new() }
    }

    pub fn at_rate(numerator: u64, denominator: u64) -> Self {
        Self::new(Script::Convert { numerator, denominator })
    }

    fn consume(&self, call: &ExchangeCall<'_>, assets: &mut AssetBook) -> Result<(), ExecutorFault> {
        if is_native(&call.asset) {
            return Ok(());
        }
        assets
            .pull(&call.asset, &self.address, &call.ledger, &self.address, call.amount)
            .map_err(ExecutorFault::Transfer)
    }

    fn deliver(&self, call: &ExchangeCall<'_>, assets: &mut AssetBook, amount: Quantity) -> Result<(), ExecutorFault> {
        assets
            .mint(&call.destination, &call.ledger, amount)
            .map_err(ExecutorFault::Transfer)
    }

    fn convert(
        &self,
        call: &ExchangeCall<'_>,
        assets: &mut AssetBook,
        numerator: u64,
        denominator: u64,
    ) -> Result<(), ExecutorFault> {
        self.consume(call, assets)?;
        let out = (call.amount as u128 * numerator as u128 / denominator as u128) as Quantity;
        self.deliver(call, assets, out)
    }
}

impl ExchangeExecutor<AssetBook> for ScriptedExecutor {
    fn address(&self) -> Address {
        self.address
    }

    fn execute(
        &mut self,
        call: &ExchangeCall<'_>,
        ledger: &mut SettlementLedger,
        assets: &mut AssetBook,
    ) -> Result<(), ExecutorFault> {
        self.calls.push(ObservedCall {
            asset: call.asset,
            amount: call.amount,
            value: call.value,
            allowance: assets.allowance(&call.asset, &call.ledger, &self.address),
            instruction: call.instruction.to_vec(),
        });

        match self.script.clone() {
            Script::Convert { numerator, denominator } => self.convert(call, assets, numerator, denominator),
            Script::Deliver(amount) => {
                self.consume(call, assets)?;
                self.deliver(call, assets, amount)
            }
            Script::Gift(amount) => self.deliver(call, assets, amount),
            Script::Revert => Err(ExecutorFault::Reverted),
            Script::Drain(amount) => {
                self.consume(call, assets)?;
                assets
                    .push(&call.destination, &call.ledger, &self.address, amount)
                    .map_err(ExecutorFault::Transfer)
            }
            Script::Resettle { users } => {
                let ctx = CallContext::new(self.address);
                let receipt = ledger
                    .settle(&ctx, &users, &call.asset, call.amount, &[], assets, self)
                    .map_err(|e| ExecutorFault::Reentry(e.code()))?;
                self.inner_receipts.push(receipt);
                self.convert(call, assets, 1, 1)
            }
            Script::Redeposit { token, amount } => {
                let ctx = CallContext::new(self.address);
                ledger
                    .deposit(&ctx, &[token], &[amount], assets)
                    .map_err(|e| ExecutorFault::Reentry(e.code()))?;
                self.convert(call, assets, 1, 1)
            }
        }
    }
}
