#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    use crate::ledger::{
        Currency, LedgerBackup, LedgerData, LedgerStore, NewPurchase, NewSale, Platform,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded_store() -> LedgerStore {
        let mut store = LedgerStore::new();
        store.add_item_type("Gems").unwrap();
        store
            .add_purchase(NewPurchase {
                item_type: "Gems".to_string(),
                currency: Currency::Cny,
                original_amount: dec!(100),
                quantity: 10,
                date: date(2024, 1, 1),
                time: Some(NaiveTime::from_hms_opt(9, 30, 0).unwrap()),
            })
            .unwrap();
        store
            .add_sale(NewSale {
                item_type: "Gems".to_string(),
                currency: Currency::Rub,
                original_amount: dec!(80),
                quantity: 4,
                date: date(2024, 1, 2),
                time: None,
                platform: Platform::Playerok,
            })
            .unwrap();
        store.upsert_rate(date(2024, 1, 1), dec!(12.5)).unwrap();
        store
    }

    #[test]
    fn test_export_import_round_trip() {
        let store = seeded_store();
        let json = LedgerBackup::from_store(&store).to_json().unwrap();

        let imported = LedgerStore::from_data(LedgerData::from_json(&json).unwrap());

        assert_eq!(imported.to_data(), store.to_data());
        assert_eq!(imported.fingerprint(), store.fingerprint());
    }

    #[test]
    fn test_backup_wire_shape() {
        let store = seeded_store();
        let json = LedgerBackup::from_store(&store).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0");
        assert!(value["exportDate"].is_string());
        assert_eq!(value["itemTypes"][0], "Gems");
        assert_eq!(value["purchases"][0]["itemType"], "Gems");
        assert_eq!(value["purchases"][0]["currency"], "CNY");
        assert_eq!(value["purchases"][0]["time"], "09:30");
        assert_eq!(value["sales"][0]["platform"], "playerok");
        assert!(value["sales"][0].get("time").is_none());
        assert_eq!(value["rates"][0]["value"], 12.5);
    }

    #[test]
    fn test_import_ignores_export_stamp() {
        let json = r#"{
            "itemTypes": ["Gems"],
            "purchases": [],
            "sales": [],
            "rates": [],
            "exportDate": "2024-05-01T12:00:00Z",
            "version": "1.0"
        }"#;

        let data = LedgerData::from_json(json).unwrap();
        assert_eq!(data.item_types, vec!["Gems".to_string()]);
        assert!(data.purchases.is_empty());
    }

    #[test]
    fn test_import_rejects_missing_required_list() {
        let json = r#"{
            "itemTypes": ["Gems"],
            "purchases": []
        }"#;
        assert!(LedgerData::from_json(json).is_err());

        assert!(LedgerData::from_json("not json at all").is_err());
    }

    #[test]
    fn test_import_defaults_for_legacy_files() {
        // Files written before rate support have no "rates" list, no sale
        // platform and an empty-string time.
        let json = r#"{
            "itemTypes": ["Gems"],
            "purchases": [
                {
                    "id": 1,
                    "itemType": "Gems",
                    "currency": "RUB",
                    "originalAmount": 100,
                    "quantity": 10,
                    "date": "2024-01-01"
                }
            ],
            "sales": [
                {
                    "id": 2,
                    "itemType": "Gems",
                    "currency": "RUB",
                    "originalAmount": 80.5,
                    "quantity": 4,
                    "date": "2024-01-02",
                    "time": ""
                }
            ]
        }"#;

        let data = LedgerData::from_json(json).unwrap();
        assert!(data.rates.is_empty());
        assert_eq!(data.purchases[0].time, None);
        assert_eq!(data.sales[0].platform, Platform::Funpay);
        assert_eq!(data.sales[0].time, None);
        assert_eq!(data.sales[0].original_amount, dec!(80.5));
    }

    #[test]
    fn test_import_preserves_ids_verbatim() {
        let json = r#"{
            "itemTypes": ["Gems"],
            "purchases": [
                {
                    "id": 1699999999999,
                    "itemType": "Gems",
                    "currency": "RUB",
                    "originalAmount": 100,
                    "quantity": 10,
                    "date": "2024-01-01"
                }
            ],
            "sales": [],
            "rates": []
        }"#;

        let store = LedgerStore::from_data(LedgerData::from_json(json).unwrap());
        assert!(store.purchase(1699999999999).is_some());
    }
}
