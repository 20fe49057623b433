use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::errors::{Result, ValidationError};
use crate::fx::{ExchangeRate, RateResolver};
use crate::matching::{
    DayProfit, FifoMatcher, ItemTypeFilter, MatchedDays, PlatformAllocator, PlatformFilter,
    PurchaseAllocation,
};
use crate::reports::{DailyProfitPoint, DayBreakdown, ItemTypeStat, PeriodTotals, ProfitReporter};
use crate::valuation::{CommissionSettings, ValuationCalculator};

use super::ledger_backup::LedgerData;
use super::ledger_errors::LedgerError;
use super::ledger_model::{NewPurchase, NewSale, Purchase, Sale, Transaction, TransactionId};

#[derive(Debug)]
struct MatchCache {
    fingerprint: String,
    result: Arc<MatchedDays>,
}

/// Owns the ledger and answers every query over it.
///
/// All mutations validate first, then apply atomically and clear the match
/// cache; a rejected mutation leaves both the data and the cache untouched.
/// Queries are pure over the current snapshot, except that the full-history
/// matching result is cached under the ledger fingerprint.
#[derive(Debug, Default)]
pub struct LedgerStore {
    item_types: Vec<String>,
    purchases: Vec<Purchase>,
    sales: Vec<Sale>,
    rates: Vec<ExchangeRate>,
    commission: CommissionSettings,
    cache: RwLock<Option<MatchCache>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: LedgerData) -> Self {
        let mut store = Self::new();
        store.replace_data(data);
        store
    }

    pub fn item_types(&self) -> &[String] {
        &self.item_types
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn rates(&self) -> &[ExchangeRate] {
        &self.rates
    }

    pub fn purchase(&self, id: TransactionId) -> Option<&Purchase> {
        self.purchases.iter().find(|p| p.id == id)
    }

    pub fn sale(&self, id: TransactionId) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    pub fn playerok_fee_percent(&self) -> Decimal {
        self.commission.playerok_fee_percent()
    }

    // --- mutations ---

    pub fn add_item_type(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::InvalidInput(
                "item type name cannot be empty".to_string(),
            )
            .into());
        }
        if self.item_types.iter().any(|t| t == &name) {
            return Err(LedgerError::DuplicateItemType(name).into());
        }
        self.item_types.push(name);
        self.invalidate();
        Ok(())
    }

    /// Renames an item type and re-keys every transaction referencing it in
    /// the same call, so matching continuity survives the rename.
    pub fn rename_item_type(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into().trim().to_string();
        if new.is_empty() {
            return Err(ValidationError::InvalidInput(
                "item type name cannot be empty".to_string(),
            )
            .into());
        }
        let position = self
            .item_types
            .iter()
            .position(|t| t == old)
            .ok_or_else(|| LedgerError::ItemTypeNotFound(old.to_string()))?;
        if new != old && self.item_types.iter().any(|t| t == &new) {
            return Err(LedgerError::DuplicateItemType(new).into());
        }

        self.item_types[position] = new.clone();
        for purchase in &mut self.purchases {
            if purchase.item_type == old {
                purchase.item_type = new.clone();
            }
        }
        for sale in &mut self.sales {
            if sale.item_type == old {
                sale.item_type = new.clone();
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Removes an item type together with every purchase and sale of it.
    pub fn remove_item_type(&mut self, name: &str) -> Result<()> {
        let position = self
            .item_types
            .iter()
            .position(|t| t == name)
            .ok_or_else(|| LedgerError::ItemTypeNotFound(name.to_string()))?;
        self.item_types.remove(position);
        self.purchases.retain(|p| p.item_type != name);
        self.sales.retain(|s| s.item_type != name);
        self.invalidate();
        Ok(())
    }

    pub fn add_purchase(&mut self, draft: NewPurchase) -> Result<TransactionId> {
        self.validate_transaction(&draft.item_type, draft.original_amount, draft.quantity)?;
        let id = self.next_id();
        self.purchases.push(draft.into_purchase(id));
        self.invalidate();
        Ok(id)
    }

    pub fn update_purchase(&mut self, id: TransactionId, draft: NewPurchase) -> Result<()> {
        self.validate_transaction(&draft.item_type, draft.original_amount, draft.quantity)?;
        let position = self
            .purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        self.purchases[position] = draft.into_purchase(id);
        self.invalidate();
        Ok(())
    }

    pub fn remove_purchase(&mut self, id: TransactionId) -> Result<()> {
        let position = self
            .purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        self.purchases.remove(position);
        self.invalidate();
        Ok(())
    }

    pub fn add_sale(&mut self, draft: NewSale) -> Result<TransactionId> {
        self.validate_transaction(&draft.item_type, draft.original_amount, draft.quantity)?;
        let id = self.next_id();
        self.sales.push(draft.into_sale(id));
        self.invalidate();
        Ok(id)
    }

    pub fn update_sale(&mut self, id: TransactionId, draft: NewSale) -> Result<()> {
        self.validate_transaction(&draft.item_type, draft.original_amount, draft.quantity)?;
        let position = self
            .sales
            .iter()
            .position(|s| s.id == id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        self.sales[position] = draft.into_sale(id);
        self.invalidate();
        Ok(())
    }

    pub fn remove_sale(&mut self, id: TransactionId) -> Result<()> {
        let position = self
            .sales
            .iter()
            .position(|s| s.id == id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        self.sales.remove(position);
        self.invalidate();
        Ok(())
    }

    /// Stores a rate for `date`, replacing any rate already on that date.
    pub fn upsert_rate(&mut self, date: NaiveDate, value: Decimal) -> Result<()> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "exchange rate must be positive, got {}",
                value
            ))
            .into());
        }
        match self.rates.iter_mut().find(|r| r.date == date) {
            Some(rate) => rate.value = value,
            None => self.rates.push(ExchangeRate { date, value }),
        }
        self.invalidate();
        Ok(())
    }

    pub fn remove_rate(&mut self, date: NaiveDate) -> Result<()> {
        let position = self
            .rates
            .iter()
            .position(|r| r.date == date)
            .ok_or(LedgerError::RateNotFound(date))?;
        self.rates.remove(position);
        self.invalidate();
        Ok(())
    }

    pub fn set_playerok_fee_percent(&mut self, percent: Decimal) -> Result<()> {
        self.commission.set_playerok_fee_percent(percent)?;
        self.invalidate();
        Ok(())
    }

    /// Wholesale import: all four lists are replaced at once.
    pub fn replace_data(&mut self, data: LedgerData) {
        debug!(
            "replacing ledger: {} item types, {} purchases, {} sales, {} rates",
            data.item_types.len(),
            data.purchases.len(),
            data.sales.len(),
            data.rates.len()
        );
        self.item_types = data.item_types;
        self.purchases = data.purchases;
        self.sales = data.sales;
        self.rates = data.rates;
        self.invalidate();
    }

    pub fn to_data(&self) -> LedgerData {
        LedgerData {
            item_types: self.item_types.clone(),
            purchases: self.purchases.clone(),
            sales: self.sales.clone(),
            rates: self.rates.clone(),
        }
    }

    fn validate_transaction(&self, item_type: &str, amount: Decimal, quantity: u32) -> Result<()> {
        if !self.item_types.iter().any(|t| t == item_type) {
            return Err(LedgerError::ItemTypeNotFound(item_type.to_string()).into());
        }
        if quantity == 0 {
            return Err(
                ValidationError::InvalidInput("quantity must be at least 1".to_string()).into(),
            );
        }
        if amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "amount must be positive, got {}",
                amount
            ))
            .into());
        }
        Ok(())
    }

    /// Ids imported from older data are kept as-is; new records continue
    /// above the highest id seen on either list.
    fn next_id(&self) -> TransactionId {
        let highest_purchase = self.purchases.iter().map(|p| p.id).max().unwrap_or(0);
        let highest_sale = self.sales.iter().map(|s| s.id).max().unwrap_or(0);
        highest_purchase.max(highest_sale) + 1
    }

    // --- queries ---

    /// Full-history per-day matching result. The all-types run is served from
    /// the cache when the ledger fingerprint still matches; a narrowed item
    /// filter always computes fresh.
    pub fn match_days(&self, types: &ItemTypeFilter) -> Arc<MatchedDays> {
        match types {
            ItemTypeFilter::All => self.matched_history(),
            ItemTypeFilter::Selected(_) => {
                let valuation = self.valuation();
                Arc::new(FifoMatcher::new(&valuation).match_days(
                    &self.purchases,
                    &self.sales,
                    types.resolve(&self.item_types),
                    None,
                ))
            }
        }
    }

    pub fn day_profit(
        &self,
        types: &ItemTypeFilter,
        platform: PlatformFilter,
        date: NaiveDate,
    ) -> DayProfit {
        self.match_days(types).day(platform, date)
    }

    pub fn period_totals(
        &self,
        types: &ItemTypeFilter,
        from: NaiveDate,
        to: NaiveDate,
        equalize: bool,
        platform: PlatformFilter,
    ) -> PeriodTotals {
        self.reporter().period_totals(types, from, to, equalize, platform)
    }

    pub fn daily_profit_series(
        &self,
        types: &ItemTypeFilter,
        from: NaiveDate,
        to: NaiveDate,
        equalize: bool,
        platform: PlatformFilter,
    ) -> Vec<DailyProfitPoint> {
        self.reporter()
            .daily_profit_series(types, from, to, equalize, platform)
    }

    pub fn item_type_stats(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        equalize: bool,
        platform: PlatformFilter,
    ) -> Vec<ItemTypeStat> {
        self.reporter().item_type_stats(from, to, equalize, platform)
    }

    pub fn day_breakdown(&self, date: NaiveDate) -> DayBreakdown {
        self.reporter().day_breakdown(date)
    }

    pub fn purchase_allocation(
        &self,
        types: &ItemTypeFilter,
        max_date: Option<NaiveDate>,
    ) -> BTreeMap<TransactionId, PurchaseAllocation> {
        let valuation = self.valuation();
        PlatformAllocator::new(&valuation).allocate(
            &self.purchases,
            &self.sales,
            types.resolve(&self.item_types),
            max_date,
        )
    }

    pub fn amount_in_reporting_currency(&self, tx: &impl Transaction) -> Decimal {
        self.valuation().amount_in_reporting_currency(tx)
    }

    pub fn net_sale_amount(&self, sale: &Sale) -> Decimal {
        self.valuation().net_sale_amount(sale)
    }

    pub fn rate_for_date(&self, date: NaiveDate) -> Decimal {
        RateResolver::new(&self.rates).rate_for_date(date)
    }

    pub fn latest_rate(&self) -> Decimal {
        RateResolver::new(&self.rates).latest()
    }

    // --- cache ---

    /// SHA-256 over every economically significant field, so two ledgers hash
    /// alike exactly when every query answers alike.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        for item_type in &self.item_types {
            hasher.update(item_type.as_bytes());
            hasher.update(b"|");
        }
        hasher.update(b"purchases|");
        for purchase in &self.purchases {
            hash_transaction(&mut hasher, purchase);
        }
        hasher.update(b"sales|");
        for sale in &self.sales {
            hash_transaction(&mut hasher, sale);
            hasher.update(sale.platform.as_str().as_bytes());
            hasher.update(b"|");
        }
        hasher.update(b"rates|");
        for rate in &self.rates {
            hasher.update(rate.date.format("%Y-%m-%d").to_string().as_bytes());
            hasher.update(b"|");
            hasher.update(normalize_decimal(rate.value).as_bytes());
            hasher.update(b"|");
        }
        hasher.update(normalize_decimal(self.commission.playerok_fee_percent()).as_bytes());

        hex::encode(hasher.finalize())
    }

    /// Drops the cached matching result. Called after every mutation; safe to
    /// call at any time.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.write() {
            if cache.is_some() {
                debug!("match cache invalidated");
            }
            *cache = None;
        }
    }

    fn matched_history(&self) -> Arc<MatchedDays> {
        let fingerprint = self.fingerprint();

        if let Ok(cache) = self.cache.read() {
            if let Some(entry) = cache.as_ref() {
                if entry.fingerprint == fingerprint {
                    return Arc::clone(&entry.result);
                }
            }
        }

        debug!("match cache miss, rebuilding full history");
        let valuation = self.valuation();
        let result = Arc::new(FifoMatcher::new(&valuation).match_days(
            &self.purchases,
            &self.sales,
            &self.item_types,
            None,
        ));

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(MatchCache {
                fingerprint,
                result: Arc::clone(&result),
            });
        }
        result
    }

    fn valuation(&self) -> ValuationCalculator<'_> {
        ValuationCalculator::new(&self.rates, &self.commission)
    }

    fn reporter(&self) -> ProfitReporter<'_> {
        ProfitReporter::new(
            &self.purchases,
            &self.sales,
            &self.item_types,
            &self.rates,
            &self.commission,
        )
    }
}

fn hash_transaction(hasher: &mut Sha256, tx: &impl Transaction) {
    hasher.update(tx.id().to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(tx.item_type().as_bytes());
    hasher.update(b"|");
    hasher.update(tx.currency().as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_decimal(tx.original_amount()).as_bytes());
    hasher.update(b"|");
    hasher.update(tx.quantity().to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(tx.date().format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(b"|");
    if let Some(time) = tx.time() {
        hasher.update(time.format("%H:%M").to_string().as_bytes());
    }
    hasher.update(b"|");
}

fn normalize_decimal(d: Decimal) -> String {
    d.normalize().to_string()
}
