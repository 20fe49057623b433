#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    use crate::errors::Error;
    use crate::ledger::{
        Currency, LedgerData, LedgerError, LedgerStore, NewPurchase, NewSale, Platform, Purchase,
    };
    use crate::matching::{ItemTypeFilter, PlatformFilter};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_purchase(item_type: &str, amount: Decimal, quantity: u32, on: NaiveDate) -> NewPurchase {
        NewPurchase {
            item_type: item_type.to_string(),
            currency: Currency::Rub,
            original_amount: amount,
            quantity,
            date: on,
            time: None,
        }
    }

    fn new_sale(
        item_type: &str,
        amount: Decimal,
        quantity: u32,
        on: NaiveDate,
        platform: Platform,
    ) -> NewSale {
        NewSale {
            item_type: item_type.to_string(),
            currency: Currency::Rub,
            original_amount: amount,
            quantity,
            date: on,
            time: None,
            platform,
        }
    }

    fn seeded_store() -> LedgerStore {
        let mut store = LedgerStore::new();
        store.add_item_type("Gems").unwrap();
        store
            .add_purchase(new_purchase("Gems", dec!(100), 10, date(2024, 1, 1)))
            .unwrap();
        store
            .add_sale(new_sale("Gems", dec!(80), 4, date(2024, 1, 2), Platform::Funpay))
            .unwrap();
        store
            .add_purchase(new_purchase("Gems", dec!(60), 5, date(2024, 1, 3)))
            .unwrap();
        store
            .add_sale(new_sale("Gems", dec!(160), 8, date(2024, 1, 4), Platform::Funpay))
            .unwrap();
        store
    }

    #[test]
    fn test_ids_are_assigned_sequentially() {
        let store = seeded_store();
        let ids: Vec<i64> = store
            .purchases()
            .iter()
            .map(|p| p.id)
            .chain(store.sales().iter().map(|s| s.id))
            .collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_ids_continue_above_imported_ones() {
        let mut store = LedgerStore::new();
        store.replace_data(LedgerData {
            item_types: vec!["Gems".to_string()],
            purchases: vec![Purchase {
                id: 1700000000000,
                item_type: "Gems".to_string(),
                currency: Currency::Rub,
                original_amount: dec!(100),
                quantity: 10,
                date: date(2024, 1, 1),
                time: None,
            }],
            sales: Vec::new(),
            rates: Vec::new(),
        });

        let id = store
            .add_purchase(new_purchase("Gems", dec!(50), 5, date(2024, 1, 2)))
            .unwrap();
        assert_eq!(id, 1700000000001);
    }

    #[test]
    fn test_transaction_validation_rejects_bad_input() {
        let mut store = LedgerStore::new();
        store.add_item_type("Gems").unwrap();

        let unknown_type =
            store.add_purchase(new_purchase("Keys", dec!(100), 10, date(2024, 1, 1)));
        assert!(matches!(
            unknown_type,
            Err(Error::Ledger(LedgerError::ItemTypeNotFound(_)))
        ));

        assert!(store
            .add_purchase(new_purchase("Gems", dec!(100), 0, date(2024, 1, 1)))
            .is_err());
        assert!(store
            .add_sale(new_sale("Gems", dec!(0), 3, date(2024, 1, 1), Platform::Funpay))
            .is_err());
        assert!(store
            .add_sale(new_sale("Gems", dec!(-5), 3, date(2024, 1, 1), Platform::Funpay))
            .is_err());

        assert!(store.purchases().is_empty());
        assert!(store.sales().is_empty());
    }

    #[test]
    fn test_update_replaces_record_keeping_id() {
        let mut store = seeded_store();
        store
            .update_purchase(1, new_purchase("Gems", dec!(90), 9, date(2024, 1, 1)))
            .unwrap();

        let updated = store.purchase(1).unwrap();
        assert_eq!(updated.quantity, 9);
        assert_eq!(updated.original_amount, dec!(90));

        let missing = store.update_purchase(99, new_purchase("Gems", dec!(1), 1, date(2024, 1, 1)));
        assert!(matches!(
            missing,
            Err(Error::Ledger(LedgerError::TransactionNotFound(99)))
        ));
    }

    #[test]
    fn test_remove_transaction() {
        let mut store = seeded_store();
        store.remove_sale(2).unwrap();
        assert!(store.sale(2).is_none());
        assert_eq!(store.sales().len(), 1);

        assert!(store.remove_sale(2).is_err());
    }

    #[test]
    fn test_item_type_names_are_validated() {
        let mut store = LedgerStore::new();
        store.add_item_type("Gems").unwrap();

        assert!(store.add_item_type("Gems").is_err());
        assert!(store.add_item_type("   ").is_err());
        assert_eq!(store.item_types(), ["Gems".to_string()]);
    }

    #[test]
    fn test_rename_item_type_rekeys_transactions() {
        let mut store = seeded_store();
        let before = store.day_profit(&ItemTypeFilter::All, PlatformFilter::Overall, date(2024, 1, 2));

        store.rename_item_type("Gems", "Jewels").unwrap();

        assert_eq!(store.item_types(), ["Jewels".to_string()]);
        assert!(store.purchases().iter().all(|p| p.item_type == "Jewels"));
        assert!(store.sales().iter().all(|s| s.item_type == "Jewels"));

        // Matching continuity: same day result under the new name.
        let after = store.day_profit(&ItemTypeFilter::All, PlatformFilter::Overall, date(2024, 1, 2));
        assert_eq!(before.profit, after.profit);

        assert!(store.rename_item_type("Gems", "Other").is_err());
    }

    #[test]
    fn test_rename_rejects_existing_target() {
        let mut store = LedgerStore::new();
        store.add_item_type("Gems").unwrap();
        store.add_item_type("Keys").unwrap();

        let result = store.rename_item_type("Gems", "Keys");
        assert!(matches!(
            result,
            Err(Error::Ledger(LedgerError::DuplicateItemType(_)))
        ));
        assert_eq!(store.item_types(), ["Gems".to_string(), "Keys".to_string()]);
    }

    #[test]
    fn test_remove_item_type_cascades_to_transactions() {
        let mut store = seeded_store();
        store.add_item_type("Keys").unwrap();
        store
            .add_purchase(new_purchase("Keys", dec!(40), 4, date(2024, 2, 1)))
            .unwrap();

        store.remove_item_type("Gems").unwrap();

        assert_eq!(store.item_types(), ["Keys".to_string()]);
        assert_eq!(store.purchases().len(), 1);
        assert_eq!(store.purchases()[0].item_type, "Keys");
        assert!(store.sales().is_empty());
    }

    #[test]
    fn test_upsert_rate_replaces_same_date() {
        let mut store = LedgerStore::new();
        store.upsert_rate(date(2024, 1, 1), dec!(12)).unwrap();
        store.upsert_rate(date(2024, 1, 1), dec!(13)).unwrap();

        assert_eq!(store.rates().len(), 1);
        assert_eq!(store.rates()[0].value, dec!(13));
        assert_eq!(store.rate_for_date(date(2024, 1, 5)), dec!(13));

        assert!(store.upsert_rate(date(2024, 1, 2), dec!(0)).is_err());
        assert!(store.upsert_rate(date(2024, 1, 2), dec!(-1)).is_err());
        assert_eq!(store.rates().len(), 1);

        store.remove_rate(date(2024, 1, 1)).unwrap();
        assert!(store.rates().is_empty());
        assert!(store.remove_rate(date(2024, 1, 1)).is_err());
        assert_eq!(store.latest_rate(), Decimal::ONE);
    }

    #[test]
    fn test_match_result_is_cached_between_reads() {
        let store = seeded_store();
        let first = store.match_days(&ItemTypeFilter::All);
        let second = store.match_days(&ItemTypeFilter::All);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_every_mutation_drops_the_cache() {
        let mut store = seeded_store();
        let before = store.match_days(&ItemTypeFilter::All);

        // A rename to the same name changes nothing economically, so only an
        // explicit cache drop can force the rebuild observed here.
        store.rename_item_type("Gems", "Gems").unwrap();
        let after = store.match_days(&ItemTypeFilter::All);

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, *after);
    }

    #[test]
    fn test_rejected_mutation_keeps_cache_and_state() {
        let mut store = seeded_store();
        let fingerprint = store.fingerprint();
        let cached = store.match_days(&ItemTypeFilter::All);

        assert!(store.set_playerok_fee_percent(dec!(200)).is_err());
        assert!(store
            .add_purchase(new_purchase("Keys", dec!(10), 1, date(2024, 1, 5)))
            .is_err());

        assert_eq!(store.fingerprint(), fingerprint);
        let still_cached = store.match_days(&ItemTypeFilter::All);
        assert!(Arc::ptr_eq(&cached, &still_cached));
    }

    #[test]
    fn test_fingerprint_tracks_economic_content() {
        let mut store = seeded_store();
        let original = store.fingerprint();

        assert_eq!(seeded_store().fingerprint(), original);

        store
            .add_purchase(new_purchase("Gems", dec!(10), 1, date(2024, 1, 5)))
            .unwrap();
        let with_purchase = store.fingerprint();
        assert_ne!(with_purchase, original);

        store.set_playerok_fee_percent(dec!(20)).unwrap();
        assert_ne!(store.fingerprint(), with_purchase);

        store.upsert_rate(date(2024, 1, 1), dec!(12)).unwrap();
        assert_ne!(store.fingerprint(), with_purchase);
    }

    #[test]
    fn test_fee_change_flows_into_sale_valuation() {
        let mut store = LedgerStore::new();
        store.add_item_type("Gems").unwrap();
        let id = store
            .add_sale(new_sale("Gems", dec!(100), 1, date(2024, 1, 1), Platform::Playerok))
            .unwrap();

        let sale = store.sale(id).unwrap().clone();
        assert_eq!(store.net_sale_amount(&sale), dec!(85.00));

        store.set_playerok_fee_percent(dec!(10)).unwrap();
        assert_eq!(store.net_sale_amount(&sale), dec!(90.0));
        assert_eq!(store.playerok_fee_percent(), dec!(10));
    }

    #[test]
    fn test_day_profit_matches_narrowed_filter() {
        let store = seeded_store();

        let all = store.day_profit(&ItemTypeFilter::All, PlatformFilter::Overall, date(2024, 1, 2));
        assert!(all.has_data);
        assert_eq!(all.profit, dec!(37.6));

        let narrowed = store.day_profit(
            &ItemTypeFilter::one("Gems"),
            PlatformFilter::Overall,
            date(2024, 1, 2),
        );
        assert_eq!(narrowed.profit, all.profit);
    }

    #[test]
    fn test_store_period_totals_delegate() {
        let store = seeded_store();
        let totals = store.period_totals(
            &ItemTypeFilter::All,
            date(2024, 1, 1),
            date(2024, 1, 4),
            true,
            PlatformFilter::Overall,
        );
        assert_eq!(totals.total_income, dec!(232.8));
        assert_eq!(totals.total_expense, dec!(124));
        assert_eq!(totals.sold_quantity, 12);
    }

    #[test]
    fn test_purchase_allocation_from_store() {
        let mut store = seeded_store();
        store
            .add_sale(new_sale("Gems", dec!(20), 1, date(2024, 1, 5), Platform::Playerok))
            .unwrap();

        let allocations = store.purchase_allocation(&ItemTypeFilter::All, None);

        // First purchase is exhausted by the funpay sales; the playerok sale
        // took one more from the second.
        assert_eq!(allocations[&1].consumed_by(Platform::Funpay), 10);
        assert_eq!(allocations[&1].unconsumed_quantity, 0);
        assert_eq!(allocations[&3].consumed_by(Platform::Funpay), 2);
        assert_eq!(allocations[&3].consumed_by(Platform::Playerok), 1);
        assert_eq!(allocations[&3].unconsumed_quantity, 2);
    }

    #[test]
    fn test_replace_data_swaps_all_lists() {
        let mut store = seeded_store();
        store.replace_data(LedgerData {
            item_types: vec!["Keys".to_string()],
            purchases: Vec::new(),
            sales: Vec::new(),
            rates: Vec::new(),
        });

        assert_eq!(store.item_types(), ["Keys".to_string()]);
        assert!(store.purchases().is_empty());
        assert!(store.sales().is_empty());
        assert!(store.rates().is_empty());
    }
}
