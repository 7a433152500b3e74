//! Solidity interface definitions for on-chain interactions.
//!
//! Contains the minimal ABI surface consumed by this client:
//! - [`IMarketToken`] — ERC-20 subset plus the meta-transaction entry points
//!   (`getNonce`, `executeMetaTransaction`) of the marketplace token
//! - [`IPaymentProcessor`] — billing and administrative surface of the payment
//!   processing contract
//! - [`MetaTransaction`] — EIP-712 payload authorizing a relayed contract call
//!
//! Only the functions actually invoked by the client are declared.

use alloy_sol_types::sol;

sol! {
    /// Marketplace token: ERC-20 subset plus native meta-transaction support.
    ///
    /// `getNonce` and `executeMetaTransaction` implement the signed-authorization
    /// replay protection used by the gasless path: the relay submits
    /// `executeMetaTransaction` with the user's split signature, and the token
    /// contract verifies it against the per-user nonce.
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IMarketToken {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function getNonce(address user) external view returns (uint256);
        function executeMetaTransaction(
            address userAddress,
            bytes functionSignature,
            bytes32 sigR,
            bytes32 sigS,
            uint8 sigV
        ) external payable returns (bytes);
    }
}

sol! {
    /// A discount slab: holders of at least `amount` staked tokens receive
    /// `percent` percent off their storage bill.
    #[allow(missing_docs)]
    #[derive(Debug)]
    struct Slab {
        uint256 amount;
        uint256 percent;
    }

    /// Payment processing contract of the storage marketplace.
    ///
    /// Charging and administrative operations are restricted by on-chain access
    /// control; this client passes them through without local authorization.
    #[allow(missing_docs)]
    #[allow(clippy::too_many_arguments)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IPaymentProcessor {
        function charge(address user, uint256 amount) external;
        function chargeWithProvider(address user, uint256 amount, address provider) external;

        function updateUnderlyingToken(address token) external;
        function updateEscrow(address escrow) external;
        function updateFeederAddress(address feeder) external;
        function updateStakedToken(address token) external;
        function updateToken(address token) external;
        function updateDiscountSlabs(uint256[] amounts, uint256[] percents) external;
        function changeBuildTimeRate(uint256 rate) external;
        function enableDiscounts() external;
        function disableDiscounts() external;
        function setGovernanceAddress(address governance) external;
        function setManagers(address[] managers) external;

        function getManagers() external view returns (address[]);
        function governanceAddress() external view returns (address);
        function underlying() external view returns (address);
        function escrow() external view returns (address);
        function discountsEnabled() external view returns (bool);
        function stakingManager() external view returns (address);
        function stakedToken() external view returns (address);
        function discountSlabs() external view returns (Slab[]);
    }
}

sol! {
    /// EIP-712 payload authorizing a relayed contract call.
    ///
    /// The signed message binds the caller, their current replay-protection
    /// nonce, and the exact ABI-encoded call; the domain binds the token
    /// contract address and chain id. The token contract recomputes this hash
    /// on `executeMetaTransaction` and rejects stale nonces.
    #[derive(Debug)]
    struct MetaTransaction {
        uint256 nonce;
        address from;
        bytes functionSignature;
    }
}
