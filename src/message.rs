use rlp::{Encodable, RlpStream};

use crate::codec::{open_list, CodecError};

/// Message types carried by an `OrderMessage` envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OrderAction {
    Fill = 1,
    Cancel = 2,
}

impl OrderAction {
    pub fn from_type(value: u128) -> Option<Self> {
        match value {
            1 => Some(Self::Fill),
            2 => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Settlement record: `solver` is paid the source-side deposit of the order
/// whose canonical bytes are `order_bytes`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderFill {
    pub id: u128,
    pub order_bytes: Vec<u8>,
    pub solver: String,
}

impl OrderFill {
    pub fn new(id: u128, order_bytes: Vec<u8>, solver: String) -> Self {
        Self {
            id,
            order_bytes,
            solver,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let rlp = open_list(bytes, 3)?;
        Ok(Self {
            id: rlp.val_at(0)?,
            order_bytes: rlp.val_at(1)?,
            solver: rlp.val_at(2)?,
        })
    }
}

impl Encodable for OrderFill {
    fn rlp_append(&self, stream: &mut RlpStream) {
        stream.begin_list(3);
        stream.append(&self.id);
        stream.append(&self.order_bytes);
        stream.append(&self.solver);
    }
}

/// Cross-chain envelope. The type is kept as a raw RLP integer of any width so
/// that unknown types still decode and can be skipped by the receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderMessage {
    pub message_type: u128,
    pub message: Vec<u8>,
}

impl OrderMessage {
    pub fn new(action: OrderAction, message: Vec<u8>) -> Self {
        Self {
            message_type: u128::from(action as u8),
            message,
        }
    }

    pub fn action(&self) -> Option<OrderAction> {
        OrderAction::from_type(self.message_type)
    }

    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let rlp = open_list(bytes, 2)?;
        Ok(Self {
            message_type: rlp.val_at(0)?,
            message: rlp.val_at(1)?,
        })
    }
}

impl Encodable for OrderMessage {
    fn rlp_append(&self, stream: &mut RlpStream) {
        stream.begin_list(2);
        stream.append(&self.message_type);
        stream.append(&self.message);
    }
}

/// Standalone cancel list. A CANCEL `OrderMessage` carries the raw order bytes
/// instead; this form exists for peers that wrap them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cancel {
    pub order_bytes: Vec<u8>,
}

impl Cancel {
    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let rlp = open_list(bytes, 1)?;
        Ok(Self {
            order_bytes: rlp.val_at(0)?,
        })
    }
}

impl Encodable for Cancel {
    fn rlp_append(&self, stream: &mut RlpStream) {
        stream.begin_list(1);
        stream.append(&self.order_bytes);
    }
}

pub const FALLBACK_SWAP: &str = "swap";
pub const FALLBACK_FILL: &str = "fill";

/// Payload of a token deposit (`ft_on_transfer` msg), telling the engine whether
/// the tokens open an order or fill one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenFallbackData {
    pub swap_order_data: Vec<u8>,
    pub kind: String,
    /// Empty for swaps
    pub solver: String,
}

impl TokenFallbackData {
    pub fn swap(swap_order_data: Vec<u8>) -> Self {
        Self {
            swap_order_data,
            kind: FALLBACK_SWAP.to_string(),
            solver: String::new(),
        }
    }

    pub fn fill(swap_order_data: Vec<u8>, solver: String) -> Self {
        Self {
            swap_order_data,
            kind: FALLBACK_FILL.to_string(),
            solver,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let rlp = open_list(bytes, 3)?;
        Ok(Self {
            swap_order_data: rlp.val_at(0)?,
            kind: rlp.val_at(1)?,
            solver: rlp.val_at(2)?,
        })
    }
}

impl Encodable for TokenFallbackData {
    fn rlp_append(&self, stream: &mut RlpStream) {
        stream.begin_list(3);
        stream.append(&self.swap_order_data);
        stream.append(&self.kind);
        stream.append(&self.solver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "6c449988e2f33302803c93f8287dc1d8cb33848a";

    fn payload() -> Vec<u8> {
        hex::decode(PAYLOAD).unwrap()
    }

    #[test]
    fn order_message_fill_vector() {
        let msg = OrderMessage::new(OrderAction::Fill, payload());
        let expected = hex::decode("d601946c449988e2f33302803c93f8287dc1d8cb33848a").unwrap();

        assert_eq!(msg.encode(), expected);
        assert_eq!(OrderMessage::decode(&expected).unwrap(), msg);
        assert_eq!(msg.action(), Some(OrderAction::Fill));
    }

    #[test]
    fn order_message_cancel_vector() {
        let msg = OrderMessage::new(OrderAction::Cancel, payload());
        let expected = hex::decode("d602946c449988e2f33302803c93f8287dc1d8cb33848a").unwrap();

        assert_eq!(msg.encode(), expected);
        assert_eq!(OrderMessage::decode(&expected).unwrap().action(), Some(OrderAction::Cancel));
    }

    #[test]
    fn order_message_unknown_type_still_decodes() {
        let msg = OrderMessage {
            message_type: 7,
            message: payload(),
        };
        let decoded = OrderMessage::decode(&msg.encode()).unwrap();

        assert_eq!(decoded.message_type, 7);
        assert_eq!(decoded.action(), None);
    }

    #[test]
    fn order_message_multi_byte_type_still_decodes() {
        let mut stream = RlpStream::new_list(2);
        stream.append(&256u16);
        stream.append(&hex::decode("010203").unwrap());
        let decoded = OrderMessage::decode(&stream.out()).unwrap();

        assert_eq!(decoded.message_type, 256);
        assert_eq!(decoded.action(), None);
        assert_eq!(decoded.message, vec![1, 2, 3]);
    }

    #[test]
    fn order_fill_vectors() {
        let fill = OrderFill::new(
            1,
            payload(),
            "0xcb0a6bbccfccde6be9f10ae781b9d9b00d6e63".to_string(),
        );
        let expected = hex::decode("f83f01946c449988e2f33302803c93f8287dc1d8cb33848aa830786362306136626263636663636465366265396631306165373831623964396230306436653633").unwrap();
        assert_eq!(fill.encode(), expected);
        assert_eq!(OrderFill::decode(&expected).unwrap(), fill);

        let fill = OrderFill::new(
            2,
            hex::decode("cb0a6bbccfccde6be9f10ae781b9d9b00d6e63").unwrap(),
            format!("0x{PAYLOAD}"),
        );
        let expected = hex::decode("f8400293cb0a6bbccfccde6be9f10ae781b9d9b00d6e63aa307836633434393938386532663333333032383033633933663832383764633164386362333338343861").unwrap();
        assert_eq!(fill.encode(), expected);
        assert_eq!(OrderFill::decode(&expected).unwrap(), fill);
    }

    #[test]
    fn cancel_vector() {
        let cancel = Cancel {
            order_bytes: payload(),
        };
        let expected = hex::decode("d5946c449988e2f33302803c93f8287dc1d8cb33848a").unwrap();

        assert_eq!(cancel.encode(), expected);
        assert_eq!(Cancel::decode(&expected).unwrap(), cancel);
    }

    #[test]
    fn token_fallback_swap_has_empty_solver() {
        let data = TokenFallbackData::swap(payload());
        let decoded = TokenFallbackData::decode(&data.encode()).unwrap();

        assert_eq!(decoded.kind, FALLBACK_SWAP);
        assert!(decoded.solver.is_empty());
        assert_eq!(decoded.swap_order_data, payload());
    }

    #[test]
    fn order_fill_rejects_message_shape() {
        let msg = OrderMessage::new(OrderAction::Fill, payload()).encode();
        assert_eq!(
            OrderFill::decode(&msg).unwrap_err(),
            CodecError::RlpIncorrectListLen
        );
    }
}
