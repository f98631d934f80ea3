//! Bot wallet: private key or BIP-39 mnemonic.
//!
//! Security notes:
//! - Secret material is held in `Zeroizing` buffers until the signer is built.
//! - Keys are loaded once at startup; no runtime rotation.
//! - Never log secret material or signatures.

use alloy::primitives::Address;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use alloy::signers::Signer as _;
use thiserror::Error;
use zeroize::Zeroizing;

/// Wallet loading and signing errors.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to decode hex: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Wallet id must be at least 1, got {0}")]
    InvalidWalletId(u32),

    #[error("Signing failed: {0}")]
    SigningFailed(#[from] alloy::signers::Error),
}

/// Where the wallet's key comes from.
pub enum WalletSource {
    /// Hex private key, with or without `0x`.
    PrivateKey(Zeroizing<String>),
    /// Mnemonic phrase plus a 1-based account number.
    Mnemonic {
        phrase: Zeroizing<String>,
        wallet_id: u32,
    },
}

impl std::fmt::Debug for WalletSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletSource::PrivateKey(_) => f.write_str("PrivateKey(..)"),
            WalletSource::Mnemonic { wallet_id, .. } => f
                .debug_struct("Mnemonic")
                .field("wallet_id", wallet_id)
                .finish_non_exhaustive(),
        }
    }
}

/// BIP-44 Ethereum path for a 1-based wallet id: `m/44'/60'/0'/0/{id - 1}`.
pub fn derivation_path(wallet_id: u32) -> Result<String, WalletError> {
    if wallet_id == 0 {
        return Err(WalletError::InvalidWalletId(wallet_id));
    }
    Ok(format!("m/44'/60'/0'/0/{}", wallet_id - 1))
}

/// Loaded wallet.
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    pub fn load(source: WalletSource) -> Result<Self, WalletError> {
        let signer = match source {
            WalletSource::PrivateKey(key) => {
                let trimmed = key.trim().trim_start_matches("0x");
                let secret_bytes = Zeroizing::new(hex::decode(trimmed)?);
                PrivateKeySigner::from_slice(&secret_bytes)
                    .map_err(|e| WalletError::InvalidKey(e.to_string()))?
            }
            WalletSource::Mnemonic { phrase, wallet_id } => {
                let path = derivation_path(wallet_id)?;
                MnemonicBuilder::<English>::default()
                    .phrase(phrase.trim())
                    .derivation_path(&path)
                    .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?
                    .build()
                    .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?
            }
        };

        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// EIP-191 personal-sign `payload`; returns the 65-byte signature as `0x` hex.
    pub async fn sign_payload(&self, payload: &[u8]) -> Result<String, WalletError> {
        let signature = self.signer.sign_message(payload).await?;
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
