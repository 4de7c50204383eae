use near_sdk::{env, near, require, AccountId};

use crate::errors::{ERR_FEE_TOO_HIGH, ERR_NOT_OWNER};
use crate::fees::FEE_POINTS;
use crate::{Contract, ContractExt};

#[near]
impl Contract {
    pub fn set_protocol_fee(&mut self, protocol_fee: u32) {
        self.assert_owner();
        require!(u128::from(protocol_fee) <= FEE_POINTS, ERR_FEE_TOO_HIGH);
        self.protocol_fee = protocol_fee;
    }

    pub fn set_fee_handler(&mut self, fee_handler: AccountId) {
        self.assert_owner();
        self.fee_handler = fee_handler;
    }

    /// Hands the relayer role to `relayer`. Only the current relayer may rotate it.
    pub fn set_admin(&mut self, relayer: AccountId) {
        self.connection.set_relayer(relayer);
    }

    pub fn get_protocol_fee(&self) -> u32 {
        self.protocol_fee
    }

    pub fn get_fee_handler(&self) -> AccountId {
        self.fee_handler.clone()
    }

    pub fn get_network_id(&self) -> String {
        self.network_id.clone()
    }

    pub fn get_owner(&self) -> AccountId {
        self.owner_id.clone()
    }

    /// Current relayer account.
    pub fn admin(&self) -> AccountId {
        self.connection.relayer().clone()
    }
}

impl Contract {
    fn assert_owner(&self) {
        require!(env::predecessor_account_id() == self.owner_id, ERR_NOT_OWNER);
    }
}
