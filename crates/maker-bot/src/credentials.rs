//! Command-line credential selection.

use maker_executor::WalletSource;
use zeroize::Zeroizing;

use crate::error::{AppError, AppResult};

/// Pick the wallet source from `--pkey` / `--mnemonic`.
///
/// Exactly one of the two must be supplied. `wallet_id` is the 1-based
/// account number used with a mnemonic and ignored for a private key.
pub fn wallet_source(
    pkey: Option<String>,
    mnemonic: Option<String>,
    wallet_id: u32,
) -> AppResult<WalletSource> {
    match (pkey, mnemonic) {
        (None, None) => Err(AppError::Credentials(
            "At least one of [pkey], [mnemonic] must be supplied".to_string(),
        )),
        (Some(_), Some(_)) => Err(AppError::Credentials(
            "Only one of [pkey], [mnemonic] must be supplied".to_string(),
        )),
        (Some(pkey), None) => Ok(WalletSource::PrivateKey(Zeroizing::new(pkey))),
        (None, Some(phrase)) => {
            if wallet_id == 0 {
                return Err(AppError::Credentials(
                    "walletid must be at least 1".to_string(),
                ));
            }
            Ok(WalletSource::Mnemonic {
                phrase: Zeroizing::new(phrase),
                wallet_id,
            })
        }
    }
}
