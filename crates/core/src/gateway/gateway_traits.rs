//! Gateway trait.

use async_trait::async_trait;

use crate::errors::Result;
use crate::summary::{Budget, CurrentUser, PeriodSummary, TotalBalance};
use crate::transactions::{NewTransaction, NewTransfer, Transaction, TransferReceipt};
use crate::wallets::{NewWallet, Wallet, WalletId, WalletUpdate};

/// Trait defining the request/response operations the synchronizer consumes.
///
/// Every call is fallible and may be slow. Callers must not assume any
/// ordering between a response and push events about the same entity.
#[async_trait]
pub trait GatewayTrait: Send + Sync {
    /// Lists all wallets of the current user.
    async fn get_wallets(&self) -> Result<Vec<Wallet>>;

    /// Sum of all wallet balances, converted by the server.
    async fn get_user_total_balance(&self) -> Result<TotalBalance>;

    /// Income/spending summary for the current period.
    async fn get_current_summary(&self) -> Result<PeriodSummary>;

    /// The signed-in user.
    async fn get_current_user(&self) -> Result<CurrentUser>;

    async fn create_wallet(&self, new_wallet: NewWallet) -> Result<Wallet>;

    async fn update_wallet(&self, wallet_id: WalletId, update: WalletUpdate) -> Result<Wallet>;

    async fn delete_wallet(&self, wallet_id: WalletId) -> Result<()>;

    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Moves money between two wallets. The server computes both legs.
    ///
    /// Returns the receipt when the server sends one the client understands.
    async fn create_transfer(&self, transfer: NewTransfer) -> Result<Option<TransferReceipt>>;

    async fn get_transactions(&self) -> Result<Vec<Transaction>>;

    /// Budget of the current month, `None` when the user has not set one.
    async fn get_current_budget(&self) -> Result<Option<Budget>>;
}
