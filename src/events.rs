use near_sdk::json_types::U128;
use near_sdk::{env, near};

use crate::codec::encode_hex;
use crate::order::SwapOrder;

/// NEP-297 events observed by relayers and indexers.
#[near(event_json(standard = "intents"))]
pub enum IntentEvent<'a> {
    #[event_version("1.0.0")]
    SwapIntent {
        id: U128,
        emitter: &'a str,
        src_nid: &'a str,
        dst_nid: &'a str,
        creator: &'a str,
        destination_address: &'a str,
        token: &'a str,
        amount: U128,
        to_token: &'a str,
        to_amount: U128,
        data: String,
    },
    #[event_version("1.0.0")]
    OrderFilled { id: U128, src_nid: &'a str },
    #[event_version("1.0.0")]
    OrderCancelled { id: U128, src_nid: &'a str },
    #[event_version("1.0.0")]
    OrderClosed { id: U128 },
    // Outbound cross-chain message; `msg` is the hex `OrderMessage` the relayer delivers
    #[event_version("1.0.0")]
    Message {
        target_network: &'a str,
        conn_sn: U128,
        msg: String,
    },
}

impl<'a> IntentEvent<'a> {
    pub fn swap_intent(order: &'a SwapOrder) -> Self {
        IntentEvent::SwapIntent {
            id: order.id,
            emitter: &order.emitter,
            src_nid: &order.src_nid,
            dst_nid: &order.dst_nid,
            creator: &order.creator,
            destination_address: &order.destination_address,
            token: &order.token,
            amount: order.amount,
            to_token: &order.to_token,
            to_amount: order.to_amount,
            data: encode_hex(&order.data.0),
        }
    }
}

// Plain log line for settlement outcomes that have no protocol event.
pub fn log_settlement(outcome: &str, order_id: u128, account: &str, amount: u128) {
    env::log_str(&format!(
        "SETTLEMENT_{}: order='{}', account='{}', amount='{}'",
        outcome, order_id, account, amount
    ));
}
