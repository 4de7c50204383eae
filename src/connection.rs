use near_sdk::json_types::U128;
use near_sdk::store::LookupSet;
use near_sdk::{env, near, require, AccountId};

use crate::codec::encode_hex;
use crate::errors::{ERR_DUPLICATE_MESSAGE, ERR_ONLY_RELAYER};
use crate::events::IntentEvent;

/// Relayer-facing message channel.
///
/// Outbound messages are numbered with a single counter shared by every peer
/// network. Inbound messages are accepted once per `(source network, sn)` and
/// only from the relayer account.
#[near(serializers = [borsh])]
pub struct Connection {
    conn_sn: u128,
    receipts: LookupSet<(String, u128)>,
    relayer: AccountId,
}

impl Connection {
    pub fn new(relayer: AccountId) -> Self {
        Self {
            conn_sn: 0,
            receipts: LookupSet::new(b"r"),
            relayer,
        }
    }

    /// Numbers `msg` and publishes it for the relayer. Returns the new sequence number.
    pub fn send_message(&mut self, to: &str, msg: &[u8]) -> u128 {
        self.conn_sn += 1;
        IntentEvent::Message {
            target_network: to,
            conn_sn: U128(self.conn_sn),
            msg: encode_hex(msg),
        }
        .emit();
        self.conn_sn
    }

    /// Consumes the receipt for `(src_network, conn_sn)`.
    pub fn recv_message(&mut self, src_network: &str, conn_sn: u128) {
        self.assert_relayer();
        require!(
            self.receipts.insert((src_network.to_string(), conn_sn)),
            ERR_DUPLICATE_MESSAGE
        );
    }

    pub fn assert_relayer(&self) {
        require!(
            env::predecessor_account_id() == self.relayer,
            ERR_ONLY_RELAYER
        );
    }

    pub fn set_relayer(&mut self, relayer: AccountId) {
        self.assert_relayer();
        self.relayer = relayer;
    }

    pub fn relayer(&self) -> &AccountId {
        &self.relayer
    }

    pub fn conn_sn(&self) -> u128 {
        self.conn_sn
    }

    pub fn has_receipt(&self, src_network: &str, conn_sn: u128) -> bool {
        self.receipts.contains(&(src_network.to_string(), conn_sn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::test_utils::{accounts, get_logs, VMContextBuilder};
    use near_sdk::testing_env;

    fn as_caller(account: AccountId) {
        testing_env!(VMContextBuilder::new()
            .predecessor_account_id(account)
            .build());
    }

    #[test]
    fn sequence_is_shared_across_peers() {
        as_caller(accounts(0));
        let mut connection = Connection::new(accounts(1));

        assert_eq!(connection.send_message("Network-2", b"a"), 1);
        assert_eq!(connection.send_message("Network-3", b"b"), 2);
        assert_eq!(connection.send_message("Network-2", b"c"), 3);
        assert_eq!(connection.conn_sn(), 3);

        let logs = get_logs();
        assert_eq!(logs.len(), 3);
        assert!(logs[1].contains("\"target_network\":\"Network-3\""));
        assert!(logs[1].contains("\"msg\":\"62\""));
    }

    #[test]
    fn receipts_are_per_source_network() {
        as_caller(accounts(1));
        let mut connection = Connection::new(accounts(1));

        connection.recv_message("Network-1", 1);
        connection.recv_message("Network-2", 1);

        assert!(connection.has_receipt("Network-1", 1));
        assert!(connection.has_receipt("Network-2", 1));
        assert!(!connection.has_receipt("Network-1", 2));
    }

    #[test]
    #[should_panic(expected = "Duplicate Message")]
    fn rejects_duplicate_receipt() {
        as_caller(accounts(1));
        let mut connection = Connection::new(accounts(1));

        connection.recv_message("Network-1", 4);
        connection.recv_message("Network-1", 4);
    }

    #[test]
    #[should_panic(expected = "OnlyRelayer")]
    fn rejects_unknown_relayer() {
        as_caller(accounts(2));
        let mut connection = Connection::new(accounts(1));

        connection.recv_message("Network-1", 1);
    }

    #[test]
    fn relayer_rotates_itself() {
        as_caller(accounts(1));
        let mut connection = Connection::new(accounts(1));
        connection.set_relayer(accounts(3));
        assert_eq!(connection.relayer(), &accounts(3));

        as_caller(accounts(3));
        connection.recv_message("Network-1", 1);
    }
}
