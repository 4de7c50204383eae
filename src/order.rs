use near_sdk::json_types::{Base64VecU8, U128};
use near_sdk::{env, near, CryptoHash};
use rlp::{Encodable, RlpStream};

use crate::codec::{open_list, CodecError};

/// A swap intent: "I deposited `amount` of `token` here; deliver `to_amount` of
/// `to_token` to `destination_address` on `dst_nid` and the deposit is yours".
///
/// Addresses and token identifiers are kept as the exact strings supplied by the
/// creator. The canonical RLP encoding of all eleven fields is hashed on both
/// networks, so nothing here is ever normalised.
#[near(serializers = [json, borsh])]
#[derive(Clone, Debug, PartialEq)]
pub struct SwapOrder {
    pub id: U128,
    /// Engine account on the source network
    pub emitter: String,
    pub src_nid: String,
    pub dst_nid: String,
    pub creator: String,
    pub destination_address: String,
    pub token: String,
    pub amount: U128,
    pub to_token: String,
    pub to_amount: U128,
    pub data: Base64VecU8,
}

impl SwapOrder {
    pub const FIELDS: usize = 11;

    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let rlp = open_list(bytes, Self::FIELDS)?;
        Ok(Self {
            id: U128(rlp.val_at(0)?),
            emitter: rlp.val_at(1)?,
            src_nid: rlp.val_at(2)?,
            dst_nid: rlp.val_at(3)?,
            creator: rlp.val_at(4)?,
            destination_address: rlp.val_at(5)?,
            token: rlp.val_at(6)?,
            amount: U128(rlp.val_at(7)?),
            to_token: rlp.val_at(8)?,
            to_amount: U128(rlp.val_at(9)?),
            data: Base64VecU8(rlp.val_at(10)?),
        })
    }

    /// keccak-256 of the canonical encoding; the cross-chain identity of the order.
    pub fn hash(&self) -> CryptoHash {
        env::keccak256_array(&self.encode())
    }

    pub fn is_same_chain(&self) -> bool {
        self.src_nid == self.dst_nid
    }
}

impl Encodable for SwapOrder {
    fn rlp_append(&self, stream: &mut RlpStream) {
        stream.begin_list(Self::FIELDS);
        stream.append(&self.id.0);
        stream.append(&self.emitter);
        stream.append(&self.src_nid);
        stream.append(&self.dst_nid);
        stream.append(&self.creator);
        stream.append(&self.destination_address);
        stream.append(&self.token);
        stream.append(&self.amount.0);
        stream.append(&self.to_token);
        stream.append(&self.to_amount.0);
        stream.append(&self.data.0);
    }
}
