use near_sdk::json_types::U128;
use near_sdk::{env, ext_contract, AccountId, Gas, NearToken, Promise};

use crate::errors::ERR_INVALID_ACCOUNT;

/// Token identifier reserved for the native NEAR asset.
pub const NATIVE_TOKEN: &str = "near";

const GAS_FOR_FT_TRANSFER: Gas = Gas::from_tgas(10);
const ONE_YOCTO: NearToken = NearToken::from_yoctonear(1);

// Only the generated `ext_fungible_token` module is called
#[allow(dead_code)]
#[ext_contract(ext_fungible_token)]
pub trait FungibleToken {
    fn ft_transfer(&mut self, receiver_id: AccountId, amount: U128, memo: Option<String>);
}

// NEP-141 Fungible Token or Native NEAR
#[derive(Clone, Debug, PartialEq)]
pub enum Asset {
    Native,
    Ft(AccountId),
}

impl Asset {
    pub fn from_token(token: &str) -> Self {
        if token == NATIVE_TOKEN {
            Asset::Native
        } else {
            Asset::Ft(parse_account(token))
        }
    }

    /// Sends `amount` of this asset from the engine to `receiver`.
    pub fn transfer(&self, receiver: AccountId, amount: u128, memo: &str) -> Promise {
        match self {
            Asset::Native => Promise::new(receiver).transfer(NearToken::from_yoctonear(amount)),
            Asset::Ft(token_id) => ext_fungible_token::ext(token_id.clone())
                .with_attached_deposit(ONE_YOCTO)
                .with_static_gas(GAS_FOR_FT_TRANSFER)
                .ft_transfer(receiver, U128(amount), Some(memo.to_string())),
        }
    }
}

/// Order fields carry addresses as opaque strings; they only have to be valid
/// NEAR accounts at the moment value is sent to them.
pub fn parse_account(address: &str) -> AccountId {
    address
        .parse()
        .unwrap_or_else(|_| env::panic_str(ERR_INVALID_ACCOUNT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::mock::MockAction;
    use near_sdk::test_utils::{get_created_receipts, VMContextBuilder};
    use near_sdk::testing_env;

    #[test]
    fn native_token_is_reserved() {
        assert_eq!(Asset::from_token(NATIVE_TOKEN), Asset::Native);
        assert_eq!(
            Asset::from_token("usdc.tokens.near"),
            Asset::Ft("usdc.tokens.near".parse().unwrap())
        );
    }

    #[test]
    fn token_transfer_calls_ft_transfer_with_one_yocto() {
        testing_env!(VMContextBuilder::new().build());
        Asset::from_token("usdc.tokens.near")
            .transfer("bob.near".parse().unwrap(), 25, "intent fill")
            .detach();

        let receipts = get_created_receipts();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].receiver_id.as_str(), "usdc.tokens.near");
        assert!(receipts[0].actions.iter().any(|action| matches!(
            action,
            MockAction::FunctionCallWeight { method_name, attached_deposit, .. }
                if method_name == b"ft_transfer" && *attached_deposit == ONE_YOCTO
        )));
    }

    #[test]
    #[should_panic(expected = "Invalid account")]
    fn rejects_foreign_addresses_at_transfer_time() {
        Asset::from_token("0x14355340E857912188b7f202d550222487");
    }
}
