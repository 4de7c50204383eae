use near_sdk::json_types::U128;
use near_sdk::store::{LookupMap, LookupSet};
use near_sdk::{
    env, ext_contract, log, near, require, AccountId, CryptoHash, Gas, PanicOnDefault, Promise,
    PromiseError, PromiseOrValue,
};

mod admin;
mod asset;
pub mod codec;
mod connection;
pub mod errors;
mod events;
mod fees;
pub mod message;
pub mod order;

pub use asset::NATIVE_TOKEN;
pub use fees::{FeeSplit, FEE_POINTS};

use asset::{parse_account, Asset};
use codec::{decode_hex, or_revert};
use connection::Connection;
use errors::*;
use events::{log_settlement, IntentEvent};
use message::{OrderAction, OrderFill, OrderMessage, TokenFallbackData, FALLBACK_FILL, FALLBACK_SWAP};
use order::SwapOrder;

const GAS_FOR_FILL_CALLBACK: Gas = Gas::from_tgas(40);
const GAS_FOR_RELEASE_CALLBACK: Gas = Gas::from_tgas(10);

// Only the generated `ext_self` module is called
#[allow(dead_code)]
#[ext_contract(ext_self)]
pub trait SelfCallbacks {
    fn on_fill_settled(
        &mut self,
        order: SwapOrder,
        solver: String,
        payout: U128,
        fee: U128,
        refund_to: Option<AccountId>,
    ) -> U128;
    fn on_release_settled(&mut self, order: SwapOrder, solver: AccountId);
}

/// A closed order whose deposit could not be delivered to the solver.
#[near(serializers = [json, borsh])]
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRelease {
    pub order: SwapOrder,
    pub solver: AccountId,
}

#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct Contract {
    pub owner_id: AccountId,
    pub network_id: String,
    /// Basis points of `to_amount` withheld on every fill
    pub protocol_fee: u32,
    pub fee_handler: AccountId,
    pub deposit_id: u128,
    // Open orders on this (source) network, keyed by the id assigned at swap time
    pub orders: LookupMap<u128, SwapOrder>,
    // Hashes of orders this (destination) network filled or acknowledged a cancel for
    pub finished_orders: LookupSet<CryptoHash>,
    // Closed orders whose release transfer failed, keyed by order id
    pub pending_releases: LookupMap<u128, PendingRelease>,
    pub connection: Connection,
}

#[near]
impl Contract {
    #[init]
    pub fn new(
        network_id: String,
        protocol_fee: u32,
        fee_handler: AccountId,
        relayer: AccountId,
        owner_id: AccountId,
    ) -> Self {
        require!(u128::from(protocol_fee) <= FEE_POINTS, ERR_FEE_TOO_HIGH);
        Self {
            owner_id,
            network_id,
            protocol_fee,
            fee_handler,
            deposit_id: 0,
            orders: LookupMap::new(b"o"),
            finished_orders: LookupSet::new(b"f"),
            pending_releases: LookupMap::new(b"p"),
            connection: Connection::new(relayer),
        }
    }

    /// NEP-141 receiver. `msg` is a hex encoded `TokenFallbackData`; the attached
    /// tokens either open the order (`swap`) or pay for filling it (`fill`).
    ///
    /// Swaps keep the whole transfer. Fills return whatever part of the payout
    /// could not be delivered so the token contract refunds the solver.
    pub fn ft_on_transfer(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        msg: String,
    ) -> PromiseOrValue<U128> {
        require!(amount.0 > 0, ERR_ZERO_TRANSFER);
        require!(!msg.is_empty(), ERR_FALLBACK_DATA_EMPTY);

        let token_id = env::predecessor_account_id();
        let data = or_revert(TokenFallbackData::decode(&decode_hex(&msg)));
        let order = or_revert(SwapOrder::decode(&data.swap_order_data));

        match data.kind.as_str() {
            FALLBACK_SWAP => {
                require!(token_id.as_str() == order.token, ERR_TOKEN_MISMATCHED);
                require!(amount == order.amount, ERR_VALUE_AMOUNT_MISMATCH);
                require!(
                    sender_id.as_str() == order.creator,
                    ERR_DEPOSITER_MUST_BE_CREATOR
                );
                self.open_order(order);
                PromiseOrValue::Value(U128(0))
            }
            FALLBACK_FILL => {
                require!(token_id.as_str() == order.to_token, ERR_TOKEN_MISMATCHED);
                require!(amount == order.to_amount, ERR_VALUE_AMOUNT_MISMATCH);
                PromiseOrValue::Promise(self.fill_order(order, data.solver, None))
            }
            _ => env::panic_str(ERR_FALLBACK_TYPE_MISMATCHED),
        }
    }

    /// Opens an order paid for with the attached NEAR. Returns the assigned id.
    #[payable]
    pub fn swap(&mut self, order_data: String) -> U128 {
        let order = or_revert(SwapOrder::decode(&decode_hex(&order_data)));
        require!(order.token == NATIVE_TOKEN, ERR_NOT_NATIVE_TOKEN);
        require!(order.amount.0 > 0, ERR_ZERO_TRANSFER);
        require!(
            env::attached_deposit().as_yoctonear() == order.amount.0,
            ERR_VALUE_AMOUNT_MISMATCH
        );
        require!(
            env::predecessor_account_id().as_str() == order.creator,
            ERR_DEPOSITER_MUST_BE_CREATOR
        );
        self.open_order(order)
    }

    /// Fills an order whose `to_token` is native NEAR with the attached deposit.
    #[payable]
    pub fn fill(&mut self, order_data: String, solver: String) -> Promise {
        let order = or_revert(SwapOrder::decode(&decode_hex(&order_data)));
        require!(order.to_token == NATIVE_TOKEN, ERR_NOT_NATIVE_TOKEN);
        require!(
            env::attached_deposit().as_yoctonear() == order.to_amount.0,
            ERR_VALUE_AMOUNT_MISMATCH
        );
        self.fill_order(order, solver, Some(env::predecessor_account_id()))
    }

    /// Asks the destination network to close the order. The deposit stays locked
    /// here until the acknowledgement arrives as a FILL paying the creator.
    pub fn cancel(&mut self, id: U128) {
        let order = self
            .orders
            .get(&id.0)
            .cloned()
            .unwrap_or_else(|| env::panic_str(ERR_ALREADY_CANCELLED));
        require!(
            env::predecessor_account_id().as_str() == order.creator,
            ERR_ONLY_CREATOR_CAN_CANCEL
        );

        let order_bytes = order.encode();
        if order.is_same_chain() {
            let network_id = self.network_id.clone();
            self.resolve_cancel(&network_id, order_bytes);
            return;
        }

        let msg = OrderMessage::new(OrderAction::Cancel, order_bytes);
        self.connection.send_message(&order.dst_nid, &msg.encode());
    }

    /// Relayer entry point: `msg` is the hex `OrderMessage` numbered `conn_sn` by
    /// the engine on `src_network`.
    pub fn recv_message(&mut self, src_network: String, conn_sn: U128, msg: String) {
        self.connection.recv_message(&src_network, conn_sn.0);

        let message = or_revert(OrderMessage::decode(&decode_hex(&msg)));
        match message.action() {
            Some(OrderAction::Fill) => {
                let fill = or_revert(OrderFill::decode(&message.message));
                self.resolve_fill(&src_network, fill).detach();
            }
            Some(OrderAction::Cancel) => self.resolve_cancel(&src_network, message.message),
            None => log!(
                "Ignoring message type {} from {}",
                message.message_type,
                src_network
            ),
        }
    }

    /// Sends a deposit whose release failed to its solver again. Anyone may call it,
    /// e.g. once the solver has registered with the token contract.
    pub fn retry_release(&mut self, id: U128) -> Promise {
        let pending = self
            .pending_releases
            .remove(&id.0)
            .unwrap_or_else(|| env::panic_str(ERR_NO_PENDING_RELEASE));
        self.release(pending.order, pending.solver)
    }

    pub fn get_order(&self, id: U128) -> Option<SwapOrder> {
        self.orders.get(&id.0).cloned()
    }

    pub fn get_pending_release(&self, id: U128) -> Option<PendingRelease> {
        self.pending_releases.get(&id.0).cloned()
    }

    /// `order_hash` is the hex keccak-256 of the canonical order encoding.
    pub fn is_order_finished(&self, order_hash: String) -> bool {
        let bytes = decode_hex(&order_hash);
        match CryptoHash::try_from(bytes.as_slice()) {
            Ok(hash) => self.finished_orders.contains(&hash),
            Err(_) => false,
        }
    }

    pub fn get_deposit_id(&self) -> U128 {
        U128(self.deposit_id)
    }

    pub fn get_conn_sn(&self) -> U128 {
        U128(self.connection.conn_sn())
    }

    pub fn get_receipt(&self, src_network: String, conn_sn: U128) -> bool {
        self.connection.has_receipt(&src_network, conn_sn.0)
    }

    // --- PRIVATE CALLBACKS ---
    #[private]
    pub fn on_fill_settled(
        &mut self,
        order: SwapOrder,
        solver: String,
        payout: U128,
        fee: U128,
        refund_to: Option<AccountId>,
    ) -> U128 {
        let outcomes = transfer_outcomes();
        let split = FeeSplit {
            payout: payout.0,
            fee: fee.0,
        };
        self.settle_fill(order, solver, split, &outcomes, refund_to)
    }

    #[private]
    pub fn on_release_settled(&mut self, order: SwapOrder, solver: AccountId) {
        let delivered = transfer_outcomes().iter().all(|ok| *ok);
        self.settle_release(order, solver, delivered);
    }
}

impl Contract {
    fn open_order(&mut self, mut order: SwapOrder) -> U128 {
        require!(!order.token.is_empty(), ERR_TOKEN_NULL);
        require!(order.src_nid == self.network_id, ERR_NID_MISCONFIGURED);
        require!(
            order.emitter == env::current_account_id().as_str(),
            ERR_EMITTER_NOT_THIS
        );

        self.deposit_id += 1;
        order.id = U128(self.deposit_id);
        IntentEvent::swap_intent(&order).emit();
        self.orders.insert(self.deposit_id, order);
        U128(self.deposit_id)
    }

    /// Marks the order finished and pays `to_amount` out as payout plus fee.
    /// Settlement continues in `on_fill_settled` once the transfers resolve.
    ///
    /// A same-chain fill is settled against the local order inside that callback,
    /// so everything the settlement needs is checked here, before any value moves.
    fn fill_order(
        &mut self,
        order: SwapOrder,
        solver: String,
        refund_to: Option<AccountId>,
    ) -> Promise {
        require!(order.dst_nid == self.network_id, ERR_INVALID_NETWORK);
        require!(order.to_amount.0 > 0, ERR_ZERO_TRANSFER);
        let order_hash = order.hash();
        require!(
            !self.finished_orders.contains(&order_hash),
            ERR_ALREADY_FILLED
        );
        if order.is_same_chain() {
            let fill = OrderFill::new(order.id.0, order.encode(), solver.clone());
            if let Err(reason) = self.check_fill(&self.network_id, &fill) {
                env::panic_str(reason);
            }
        }
        self.finished_orders.insert(order_hash);

        let split = FeeSplit::compute(order.to_amount.0, self.protocol_fee);
        let asset = Asset::from_token(&order.to_token);
        let destination = parse_account(&order.destination_address);

        let payout_leg =
            (split.payout > 0).then(|| asset.transfer(destination, split.payout, "intent fill"));
        let fee_leg = (split.fee > 0)
            .then(|| asset.transfer(self.fee_handler.clone(), split.fee, "intent protocol fee"));
        let transfers = match (payout_leg, fee_leg) {
            (Some(payout), Some(fee)) => payout.and(fee),
            (Some(payout), None) => payout,
            (None, Some(fee)) => fee,
            (None, None) => env::panic_str(ERR_ZERO_TRANSFER),
        };

        transfers.then(
            ext_self::ext(env::current_account_id())
                .with_static_gas(GAS_FOR_FILL_CALLBACK)
                .on_fill_settled(
                    order,
                    solver,
                    U128(split.payout),
                    U128(split.fee),
                    refund_to,
                ),
        )
    }

    /// `outcomes` lists the non-zero legs in the order they were sent: payout, then fee.
    /// The fill stands only if the payout was delivered. Returns what was not delivered,
    /// and sends it back to `refund_to` when the fill was paid in native NEAR.
    ///
    /// Runs after value has moved, so it must not panic.
    fn settle_fill(
        &mut self,
        order: SwapOrder,
        solver: String,
        split: FeeSplit,
        outcomes: &[bool],
        refund_to: Option<AccountId>,
    ) -> U128 {
        let mut outcomes = outcomes.iter().copied();
        let payout_ok = split.payout == 0 || outcomes.next().unwrap_or(false);
        let fee_ok = split.fee == 0 || outcomes.next().unwrap_or(false);

        let mut refund = 0;
        if !fee_ok {
            refund += split.fee;
            log_settlement("FEE_RETURNED", order.id.0, self.fee_handler.as_str(), split.fee);
        }

        if payout_ok {
            log_settlement(
                "FILLED",
                order.id.0,
                &order.destination_address,
                split.payout,
            );
            self.dispatch_fill(order, solver);
        } else {
            refund += split.payout;
            self.finished_orders.remove(&order.hash());
            log_settlement(
                "FILL_REVERTED",
                order.id.0,
                &order.destination_address,
                split.payout,
            );
        }

        if refund > 0 {
            if let Some(payer) = refund_to {
                Asset::Native
                    .transfer(payer, refund, "intent fill refund")
                    .detach();
            }
        }
        U128(refund)
    }

    /// Reports a delivered fill to the source network, or settles it directly
    /// when both sides of the order live on this network.
    fn dispatch_fill(&mut self, order: SwapOrder, solver: String) {
        let fill = OrderFill::new(order.id.0, order.encode(), solver);
        if order.is_same_chain() {
            match self.check_fill(&self.network_id, &fill) {
                Ok((order, solver)) => self.close_and_release(order, solver).detach(),
                Err(reason) => log!("Release of order {} skipped: {}", fill.id, reason),
            }
            return;
        }

        let msg = OrderMessage::new(OrderAction::Fill, fill.encode());
        self.connection.send_message(&order.src_nid, &msg.encode());
        IntentEvent::OrderFilled {
            id: order.id,
            src_nid: &order.src_nid,
        }
        .emit();
    }

    /// The open order `fill` settles and the account to pay, provided the fill was
    /// reported by the order's destination network.
    fn check_fill(
        &self,
        src_network: &str,
        fill: &OrderFill,
    ) -> Result<(SwapOrder, AccountId), &'static str> {
        let order = self
            .orders
            .get(&fill.id)
            .cloned()
            .ok_or(ERR_NO_ORDER_TO_RESOLVE)?;
        if order.hash() != env::keccak256_array(&fill.order_bytes) {
            return Err(ERR_MISMATCHED_ORDER);
        }
        if order.dst_nid != src_network {
            return Err(ERR_INVALID_NETWORK);
        }
        let solver = fill.solver.parse().map_err(|_| ERR_INVALID_ACCOUNT)?;
        Ok((order, solver))
    }

    /// Source side: closes the order and releases the deposit to the solver.
    fn resolve_fill(&mut self, src_network: &str, fill: OrderFill) -> Promise {
        let (order, solver) = self
            .check_fill(src_network, &fill)
            .unwrap_or_else(|reason| env::panic_str(reason));
        self.close_and_release(order, solver)
    }

    fn close_and_release(&mut self, order: SwapOrder, solver: AccountId) -> Promise {
        self.orders.remove(&order.id.0);
        IntentEvent::OrderClosed { id: order.id }.emit();
        self.release(order, solver)
    }

    /// Pays the deposit of a closed order; a failed transfer lands in `pending_releases`.
    fn release(&mut self, order: SwapOrder, solver: AccountId) -> Promise {
        Asset::from_token(&order.token)
            .transfer(solver.clone(), order.amount.0, "intent release")
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(GAS_FOR_RELEASE_CALLBACK)
                    .on_release_settled(order, solver),
            )
    }

    fn settle_release(&mut self, order: SwapOrder, solver: AccountId, delivered: bool) {
        if delivered {
            log_settlement("RELEASED", order.id.0, solver.as_str(), order.amount.0);
            return;
        }

        log_settlement("RELEASE_FAILED", order.id.0, solver.as_str(), order.amount.0);
        self.pending_releases
            .insert(order.id.0, PendingRelease { order, solver });
    }

    /// Destination side: acknowledges a cancel unless the order was already filled.
    /// The acknowledgement is a FILL naming the creator as solver, which refunds them
    /// on the source network.
    fn resolve_cancel(&mut self, src_network: &str, order_bytes: Vec<u8>) {
        let order_hash = env::keccak256_array(&order_bytes);
        if self.finished_orders.contains(&order_hash) {
            return;
        }

        let order = or_revert(SwapOrder::decode(&order_bytes));
        require!(order.src_nid == src_network, ERR_INVALID_NETWORK);
        self.finished_orders.insert(order_hash);

        let fill = OrderFill::new(order.id.0, order_bytes, order.creator.clone());
        let msg = OrderMessage::new(OrderAction::Fill, fill.encode());
        self.connection.send_message(&order.src_nid, &msg.encode());
        IntentEvent::OrderCancelled {
            id: order.id,
            src_nid: &order.src_nid,
        }
        .emit();
    }
}

fn transfer_outcomes() -> Vec<bool> {
    (0..env::promise_results_count())
        .map(|index| transfer_succeeded(env::promise_result_checked(index, 0)))
        .collect()
}

// Transfers return nothing worth reading, so an oversized result still counts as delivered
fn transfer_succeeded(result: Result<Vec<u8>, PromiseError>) -> bool {
    !matches!(result, Err(PromiseError::Failed))
}
