use log::{info, warn};
use std::collections::HashSet;

use crate::model::{CustomerName, Dozens, OrderRecord, Totals};
use crate::pricing::Prices;

pub use error::{Result, StoreError, ValidationError};
#[cfg(test)]
pub use sheet::decode;
pub use sheet::{encode, XlsxFile, HEADER};

mod error;
mod sheet;

/// Where the order table lives between sessions.
pub trait Persistence {
    /// Returns the persisted table, or `None` when nothing has been persisted yet
    fn read(&self) -> Result<Option<Vec<OrderRecord>>>;

    /// Replaces the persisted table with `records`
    fn write(&mut self, records: &[OrderRecord]) -> Result<()>;

    /// Drops the persisted table. Removing a table that does not exist is not an error
    fn remove(&mut self) -> Result<()>;
}

/// The order table of one session.
///
/// Every mutation rewrites the whole persisted table. When that write fails
/// the in-memory table is restored, so the store never claims a change the
/// file does not hold.
#[derive(Debug)]
pub struct OrderStore<P> {
    backend: P,
    prices: Prices,
    records: Vec<OrderRecord>,
}

impl<P: Persistence> OrderStore<P> {
    /// Reads the persisted table. A missing table yields an empty store.
    pub fn load(backend: P, prices: Prices) -> Result<Self> {
        let records = backend.read()?.unwrap_or_default();

        {
            let mut seen = HashSet::new();
            for record in &records {
                if !seen.insert(record.customer_name.as_str()) {
                    warn!(
                        "Found more than one order for {}, edits apply to the first one",
                        record.customer_name
                    );
                }
            }
        }

        info!("Loaded {} orders", records.len());
        Ok(Self {
            backend,
            prices,
            records,
        })
    }

    pub fn prices(&self) -> &Prices {
        &self.prices
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First order placed under `key`.
    pub fn find(&self, key: &str) -> Option<&OrderRecord> {
        self.records.iter().find(|record| record.belongs_to(key))
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.records)
    }

    /// Prices a new order at the session prices and appends it.
    pub fn add(&mut self, name: &str, quantity_a: Dozens, quantity_b: Dozens) -> Result<&OrderRecord> {
        let customer_name = CustomerName::new(name)?;
        let record = OrderRecord::priced(customer_name, quantity_a, quantity_b, &self.prices);
        self.append(record)?;

        Ok(&self.records[self.records.len() - 1])
    }

    pub fn append(&mut self, record: OrderRecord) -> Result<()> {
        if self.find(&record.customer_name).is_some() {
            return Err(ValidationError::DuplicateCustomer(record.customer_name.into()).into());
        }

        let snapshot = self.records.clone();
        info!(
            "Adding order for {}: {} + {} dozens, total {}",
            record.customer_name, record.quantity_a, record.quantity_b, record.total
        );
        self.records.push(record);
        self.persist(snapshot)
    }

    /// Sets new quantities on the first order under `key` and reprices it.
    pub fn update(
        &mut self,
        key: &str,
        quantity_a: Dozens,
        quantity_b: Dozens,
    ) -> Result<&OrderRecord> {
        let Some(index) = self.records.iter().position(|record| record.belongs_to(key)) else {
            return Err(StoreError::NotFound(key.trim().to_string()));
        };

        let snapshot = self.records.clone();
        let prices = self.prices;
        let record = &mut self.records[index];
        record.reprice(quantity_a, quantity_b, &prices);
        info!(
            "Updated order for {}: {} + {} dozens, total {}",
            record.customer_name, record.quantity_a, record.quantity_b, record.total
        );
        self.persist(snapshot)?;

        Ok(&self.records[index])
    }

    /// Removes every order under `key` and returns how many there were.
    pub fn delete(&mut self, key: &str) -> Result<usize> {
        let snapshot = self.records.clone();
        self.records.retain(|record| !record.belongs_to(key));

        let removed = snapshot.len() - self.records.len();
        if removed == 0 {
            return Err(StoreError::NotFound(key.trim().to_string()));
        }

        info!("Deleted {} order(s) for {}", removed, key.trim());
        self.persist(snapshot)?;
        Ok(removed)
    }

    /// Empties the table and drops the persisted file.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove()?;
        info!("Cleared {} orders", self.records.len());
        self.records.clear();
        Ok(())
    }

    /// Spreadsheet bytes of the current table.
    pub fn export(&self) -> Result<Vec<u8>> {
        encode(&self.records)
    }

    fn persist(&mut self, snapshot: Vec<OrderRecord>) -> Result<()> {
        if let Err(err) = self.backend.write(&self.records) {
            warn!("Could not persist orders, keeping the previous table: {}", err);
            self.records = snapshot;
            return Err(err);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Keeps the table in memory and can be told to fail writes.
    #[derive(Debug, Default)]
    struct MemoryBackend {
        table: Option<Vec<OrderRecord>>,
        fail_writes: bool,
        writes: usize,
    }

    impl Persistence for MemoryBackend {
        fn read(&self) -> Result<Option<Vec<OrderRecord>>> {
            Ok(self.table.clone())
        }

        fn write(&mut self, records: &[OrderRecord]) -> Result<()> {
            if self.fail_writes {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.writes += 1;
            self.table = Some(records.to_vec());
            Ok(())
        }

        fn remove(&mut self) -> Result<()> {
            if self.fail_writes {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "locked").into());
            }
            self.table = None;
            Ok(())
        }
    }

    fn prices() -> Prices {
        Prices::new(dec!(6000), dec!(3500)).unwrap()
    }

    fn dozens(s: &str) -> Dozens {
        s.parse().unwrap()
    }

    fn memory_store() -> OrderStore<MemoryBackend> {
        OrderStore::load(MemoryBackend::default(), prices()).unwrap()
    }

    fn file_store(path: &std::path::Path) -> OrderStore<XlsxFile> {
        OrderStore::load(XlsxFile::new(path), prices()).unwrap()
    }

    fn names<P: Persistence>(store: &OrderStore<P>) -> Vec<&str> {
        store
            .records()
            .iter()
            .map(|record| record.customer_name.as_str())
            .collect()
    }

    #[test]
    fn should_load_empty_table_when_nothing_is_persisted() {
        let store = memory_store();

        assert!(store.is_empty());
        assert_eq!(store.backend.writes, 0);
    }

    #[test]
    fn should_persist_every_append() {
        let mut store = memory_store();

        store.add("Ana", dozens("1.5"), Dozens::ZERO).unwrap();
        store.add("Beto", dozens("0.25"), dozens("0.25")).unwrap();

        assert_eq!(store.backend.writes, 2);
        assert_eq!(store.backend.table.as_deref(), Some(store.records()));
    }

    #[test]
    fn should_price_orders_at_session_prices() {
        let mut store = memory_store();

        let ana = store.add("Ana", dozens("1.5"), Dozens::ZERO).unwrap().total;
        let beto = store.add("Beto", dozens("0.25"), dozens("0.25")).unwrap().total;

        assert_eq!(ana, dec!(9500));
        assert_eq!(beto, dec!(3500));
    }

    #[test]
    fn should_reject_empty_name_without_writing() {
        let mut store = memory_store();

        let err = store.add("  ", dozens("1"), Dozens::ZERO).unwrap_err();

        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyCustomerName)
        ));
        assert_eq!(store.backend.writes, 0);
    }

    #[test]
    fn should_reject_duplicate_customer() {
        let mut store = memory_store();
        store.add("Ana", dozens("1"), Dozens::ZERO).unwrap();

        let err = store.add("Ana", dozens("2"), Dozens::ZERO).unwrap_err();

        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::DuplicateCustomer(ref name)) if name == "Ana"
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn should_roll_back_append_when_write_fails() {
        let mut store = memory_store();
        store.add("Ana", dozens("1"), Dozens::ZERO).unwrap();
        store.backend.fail_writes = true;

        let err = store.add("Beto", dozens("1"), Dozens::ZERO).unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(names(&store), vec!["Ana"]);
    }

    #[test]
    fn should_update_and_reprice_order() {
        let mut store = memory_store();
        store.add("Ana", dozens("1.5"), Dozens::ZERO).unwrap();

        let updated = store.update("Ana", dozens("2"), dozens("0.5")).unwrap();

        assert_eq!(updated.total, dec!(15500));
        assert_eq!(store.backend.table.as_ref().unwrap()[0].total, dec!(15500));
    }

    #[test]
    fn should_keep_stale_totals_of_untouched_orders() {
        let mut store = memory_store();
        store.add("Ana", dozens("1"), Dozens::ZERO).unwrap();
        store.add("Beto", dozens("1"), Dozens::ZERO).unwrap();
        store.prices = Prices::new(dec!(7000), dec!(4000)).unwrap();

        store.update("Beto", dozens("1"), Dozens::ZERO).unwrap();

        assert_eq!(store.find("Ana").unwrap().total, dec!(6000));
        assert_eq!(store.find("Beto").unwrap().total, dec!(7000));
    }

    #[test]
    fn should_update_first_match_of_legacy_duplicates() {
        let mut backend = MemoryBackend::default();
        let ana = OrderRecord::priced(
            CustomerName::new("Ana").unwrap(),
            dozens("1"),
            Dozens::ZERO,
            &prices(),
        );
        backend.table = Some(vec![ana.clone(), ana]);
        let mut store = OrderStore::load(backend, prices()).unwrap();

        store.update("Ana", dozens("0.5"), Dozens::ZERO).unwrap();

        assert_eq!(store.records()[0].total, dec!(3500));
        assert_eq!(store.records()[1].total, dec!(6000));
    }

    #[test]
    fn should_report_update_of_unknown_customer() {
        let mut store = memory_store();

        let err = store.update("Nadie", dozens("1"), Dozens::ZERO).unwrap_err();

        assert!(matches!(err, StoreError::NotFound(ref name) if name == "Nadie"));
        assert_eq!(store.backend.writes, 0);
    }

    #[test]
    fn should_roll_back_update_when_write_fails() {
        let mut store = memory_store();
        store.add("Ana", dozens("1"), Dozens::ZERO).unwrap();
        store.backend.fail_writes = true;

        assert!(store.update("Ana", dozens("3"), Dozens::ZERO).is_err());

        assert_eq!(store.find("Ana").unwrap().total, dec!(6000));
    }

    #[test]
    fn should_delete_every_match() {
        let mut backend = MemoryBackend::default();
        let record = |name: &str| {
            OrderRecord::priced(CustomerName::new(name).unwrap(), dozens("1"), Dozens::ZERO, &prices())
        };
        backend.table = Some(vec![record("Ana"), record("Beto"), record("Ana")]);
        let mut store = OrderStore::load(backend, prices()).unwrap();

        assert_eq!(store.delete("Ana").unwrap(), 2);
        assert_eq!(names(&store), vec!["Beto"]);
    }

    #[test]
    fn should_report_delete_of_unknown_customer() {
        let mut store = memory_store();
        store.add("Ana", dozens("1"), Dozens::ZERO).unwrap();

        let err = store.delete("Beto").unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.backend.writes, 1);
    }

    #[test]
    fn should_keep_table_when_clear_fails() {
        let mut store = memory_store();
        store.add("Ana", dozens("1"), Dozens::ZERO).unwrap();
        store.backend.fail_writes = true;

        assert!(store.clear().is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn should_sum_running_totals() {
        let mut store = memory_store();
        store.add("Ana", dozens("1.5"), Dozens::ZERO).unwrap();
        store.add("Beto", dozens("0.25"), dozens("0.25")).unwrap();

        let totals = store.totals();

        assert_eq!(totals.orders, 2);
        assert_eq!(totals.quantity_a.value(), dec!(1.75));
        assert_eq!(totals.quantity_b.value(), dec!(0.25));
        assert_eq!(totals.total, dec!(13000));
    }

    #[test]
    fn should_find_appended_order_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.xlsx");
        let mut store = file_store(&path);
        let record = OrderRecord::priced(
            CustomerName::new("Ana").unwrap(),
            dozens("1.5"),
            dozens("0.75"),
            &prices(),
        );

        store.append(record.clone()).unwrap();
        let reloaded = file_store(&path);

        assert_eq!(reloaded.records(), &[record]);
    }

    #[test]
    fn should_export_same_table_twice() {
        let mut store = memory_store();
        store.add("Ana", dozens("1.5"), Dozens::ZERO).unwrap();
        store.add("Beto", dozens("0.25"), dozens("0.25")).unwrap();

        let first = decode(store.export().unwrap()).unwrap();
        let second = decode(store.export().unwrap()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, store.records());
        assert_eq!(store.backend.writes, 2);
    }

    #[test]
    fn should_run_the_whole_session_against_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.xlsx");
        let mut store = file_store(&path);

        store.add("Ana", dozens("1.5"), Dozens::ZERO).unwrap();
        store.add("Beto", dozens("0.25"), dozens("0.25")).unwrap();
        store.delete("Ana").unwrap();

        assert_eq!(names(&file_store(&path)), vec!["Beto"]);
        assert_eq!(file_store(&path).find("Beto").unwrap().total, dec!(3500));

        store.clear().unwrap();

        assert!(store.is_empty());
        assert!(!path.exists());
        assert!(file_store(&path).is_empty());
    }
}
