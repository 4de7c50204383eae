// Revert reasons. Peer engines and relayers match on these strings, keep them stable.

// Authorisation
pub const ERR_NOT_OWNER: &str = "Not Owner";
pub const ERR_ONLY_RELAYER: &str = "OnlyRelayer";
pub const ERR_ONLY_CREATOR_CAN_CANCEL: &str = "Only creator can cancel this order";
pub const ERR_DEPOSITER_MUST_BE_CREATOR: &str = "Depositer must be creator";

// Configuration mismatch
pub const ERR_NID_MISCONFIGURED: &str = "NID is misconfigured";
pub const ERR_EMITTER_NOT_THIS: &str = "Emitter specified is not this";
pub const ERR_INVALID_NETWORK: &str = "Invalid Network";

// Validation
pub const ERR_VALUE_AMOUNT_MISMATCH: &str = "Value and amount must be equal";
pub const ERR_TOKEN_NULL: &str = "Token can't be null";
pub const ERR_FALLBACK_DATA_EMPTY: &str = "Token Fallback: Data can't be empty";
pub const ERR_ZERO_TRANSFER: &str = "Zero transfers not allowed";
pub const ERR_TOKEN_MISMATCHED: &str = "Token mismatched";
pub const ERR_NOT_NATIVE_TOKEN: &str = "Not a native token";
pub const ERR_FEE_TOO_HIGH: &str = "Protocol fee exceeds 100%";
pub const ERR_INVALID_ACCOUNT: &str = "Invalid account";

// Idempotence / duplication
pub const ERR_ALREADY_FILLED: &str = "Order has already been filled";
pub const ERR_DUPLICATE_MESSAGE: &str = "Duplicate Message";
pub const ERR_ALREADY_CANCELLED: &str = "Order already has been cancelled";
pub const ERR_NO_ORDER_TO_RESOLVE: &str = "There is no order to resolve";
pub const ERR_MISMATCHED_ORDER: &str = "Mismatched order";
pub const ERR_NO_PENDING_RELEASE: &str = "No pending release for this order";

// Dispatch
pub const ERR_FALLBACK_TYPE_MISMATCHED: &str = "Message type mismatched(swap/fill)";

// Codec
pub const ERR_DECODE_FAILED: &str = "Rlp decode failed";
pub const ERR_INVALID_HEX: &str = "Invalid hex payload";
