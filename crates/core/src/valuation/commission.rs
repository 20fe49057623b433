use log::debug;
use rust_decimal::Decimal;

use crate::constants::{DEFAULT_PLAYEROK_FEE_PERCENT, FUNPAY_FEE_PERCENT};
use crate::errors::{Error, Result};
use crate::ledger::Platform;

/// Per-platform sale commission configuration.
///
/// funpay takes a fixed 3%. playerok's fee is user-configurable within
/// [0, 100] percent; an out-of-range value is rejected and the previous value
/// stays in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionSettings {
    playerok_fee_percent: Decimal,
}

impl Default for CommissionSettings {
    fn default() -> Self {
        CommissionSettings {
            playerok_fee_percent: Decimal::from(DEFAULT_PLAYEROK_FEE_PERCENT),
        }
    }
}

impl CommissionSettings {
    pub fn playerok_fee_percent(&self) -> Decimal {
        self.playerok_fee_percent
    }

    pub fn set_playerok_fee_percent(&mut self, percent: Decimal) -> Result<()> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(Error::InvalidConfigValue(format!(
                "playerok fee percent must be within [0, 100], got {}",
                percent
            )));
        }
        debug!("playerok fee percent set to {}", percent);
        self.playerok_fee_percent = percent;
        Ok(())
    }

    /// Multiplier turning a gross sale amount into the seller's net.
    pub fn multiplier(&self, platform: Platform) -> Decimal {
        let fee_percent = match platform {
            Platform::Funpay => Decimal::from(FUNPAY_FEE_PERCENT),
            Platform::Playerok => self.playerok_fee_percent,
        };
        Decimal::ONE - fee_percent / Decimal::ONE_HUNDRED
    }
}
