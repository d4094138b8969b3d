//! # The Store
//!
//! The process-wide owner of all persisted state: companies, products,
//! the three document collections, print templates and the per-kind
//! document counters.
//!
//! ## Ownership Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The Store is the SOLE mutator and the SOLE source of truth.            │
//! │                                                                         │
//! │  - reads hand out snapshots (clones); callers never hold references     │
//! │    into the store's collections                                         │
//! │  - every mutation validates, upserts, persists the full snapshot        │
//! │    (last-write-wins) and then notifies the observer list                │
//! │  - the rendering/aggregation core never sees the store; hosts pass      │
//! │    snapshots into it as plain arguments                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Document Numbering
//! Each document kind owns a monotonic counter starting at 1. A number
//! is taken exactly once, zero-padded to four digits, and never reused -
//! deleting a document does not release its number.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use schetovod_core::demo::{demo_products, seed_companies};
use schetovod_core::template::standard_templates;
use schetovod_core::types::{
    Company, CompanyId, DocKind, Document, DocumentId, Product, ProductId, TemplateId,
};
use schetovod_core::validation::{validate_company, validate_product};
use schetovod_core::{format_doc_number, TemplateSettings};

use crate::error::{StoreError, StoreResult};
use crate::kv::KvBackend;

// =============================================================================
// Storage Keys
// =============================================================================

/// Snapshot keys, byte-compatible with the original records.
mod keys {
    pub const COMPANIES: &str = "mb_companies";
    pub const PRODUCTS: &str = "mb_products";
    pub const INVOICES: &str = "mb_invoices";
    pub const ACTS: &str = "mb_acts";
    pub const UPDS: &str = "mb_upds";
    pub const TEMPLATES: &str = "mb_templates";
    pub const INVOICE_COUNTER: &str = "mb_invoiceCounter";
    pub const ACT_COUNTER: &str = "mb_actCounter";
    pub const UPD_COUNTER: &str = "mb_updCounter";

    pub const ALL: [&str; 9] = [
        COMPANIES,
        PRODUCTS,
        INVOICES,
        ACTS,
        UPDS,
        TEMPLATES,
        INVOICE_COUNTER,
        ACT_COUNTER,
        UPD_COUNTER,
    ];
}

// =============================================================================
// Change Feed
// =============================================================================

/// What a mutation touched; delivered to observers after persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Companies,
    Products,
    Documents(DocKind),
    Templates,
}

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
pub type SubscriptionId = u64;

type Observer = Box<dyn Fn(&Change)>;

// =============================================================================
// Store
// =============================================================================

/// The synchronous repository over a [`KvBackend`].
pub struct Store {
    kv: Box<dyn KvBackend>,
    companies: Vec<Company>,
    products: Vec<Product>,
    invoices: Vec<Document>,
    acts: Vec<Document>,
    upds: Vec<Document>,
    templates: Vec<TemplateSettings>,
    invoice_counter: u64,
    act_counter: u64,
    upd_counter: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl Store {
    /// Opens a store over a backend: loads every snapshot, backfills
    /// fields older records miss, seeds an empty store with the demo
    /// reference data and the three standard templates, and writes the
    /// normalized snapshot back.
    pub fn open(kv: Box<dyn KvBackend>) -> StoreResult<Self> {
        let companies: Vec<Company> = load_or_default(kv.as_ref(), keys::COMPANIES)?;
        let products: Vec<Product> = load_or_default(kv.as_ref(), keys::PRODUCTS)?;
        let invoices: Vec<Document> = load_or_default(kv.as_ref(), keys::INVOICES)?;
        let acts: Vec<Document> = load_or_default(kv.as_ref(), keys::ACTS)?;
        let upds: Vec<Document> = load_or_default(kv.as_ref(), keys::UPDS)?;
        let templates: Vec<TemplateSettings> = load_or_default(kv.as_ref(), keys::TEMPLATES)?;

        let mut store = Store {
            invoice_counter: load_counter(kv.as_ref(), keys::INVOICE_COUNTER)?,
            act_counter: load_counter(kv.as_ref(), keys::ACT_COUNTER)?,
            upd_counter: load_counter(kv.as_ref(), keys::UPD_COUNTER)?,
            kv,
            companies,
            products,
            invoices,
            acts,
            upds,
            templates,
            observers: Vec::new(),
            next_subscription: 1,
        };

        if store.templates.is_empty() {
            info!("seeding standard templates");
            store.templates = standard_templates();
        }
        if store.companies.is_empty() {
            info!("seeding demo reference data");
            store.companies = seed_companies();
            store.products = demo_products();
        }

        // Writing back immediately persists the migration backfill
        // (director/accountant/unit defaults) and any seed data.
        store.persist()?;
        Ok(store)
    }

    // -- reads (snapshots, never references) ----------------------------------

    pub fn companies(&self) -> Vec<Company> {
        self.companies.clone()
    }

    pub fn company(&self, id: &CompanyId) -> Option<Company> {
        self.companies.iter().find(|c| &c.id == id).cloned()
    }

    pub fn products(&self) -> Vec<Product> {
        self.products.clone()
    }

    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.products.iter().find(|p| &p.id == id).cloned()
    }

    pub fn documents(&self, kind: DocKind) -> Vec<Document> {
        self.collection(kind).clone()
    }

    pub fn document(&self, kind: DocKind, id: &DocumentId) -> Option<Document> {
        self.collection(kind).iter().find(|d| &d.id == id).cloned()
    }

    /// Looks a document up by its display number.
    pub fn document_by_number(&self, kind: DocKind, number: &str) -> Option<Document> {
        self.collection(kind)
            .iter()
            .find(|d| d.number == number)
            .cloned()
    }

    pub fn templates(&self) -> Vec<TemplateSettings> {
        self.templates.clone()
    }

    pub fn template(&self, id: &TemplateId) -> Option<TemplateSettings> {
        self.templates.iter().find(|t| &t.id == id).cloned()
    }

    /// The first template targeting a document kind, if any - the one
    /// the host applies when the user has not picked one explicitly.
    pub fn template_for(&self, kind: DocKind) -> Option<TemplateSettings> {
        self.templates.iter().find(|t| t.doc_type == kind).cloned()
    }

    // -- mutations ------------------------------------------------------------

    /// Inserts or replaces a company.
    pub fn save_company(&mut self, company: Company) -> StoreResult<()> {
        validate_company(&company)?;
        debug!(id = %company.id, name = %company.name, "saving company");
        upsert(&mut self.companies, company, |c| c.id.clone());
        self.commit(Change::Companies)
    }

    /// Deletes a company. Documents referencing it keep their dangling
    /// id and render the missing-counterparty placeholder.
    pub fn delete_company(&mut self, id: &CompanyId) -> StoreResult<()> {
        debug!(id = %id, "deleting company");
        self.companies.retain(|c| &c.id != id);
        self.commit(Change::Companies)
    }

    /// Inserts or replaces a product.
    pub fn save_product(&mut self, product: Product) -> StoreResult<()> {
        validate_product(&product)?;
        debug!(id = %product.id, name = %product.name, "saving product");
        upsert(&mut self.products, product, |p| p.id.clone());
        self.commit(Change::Products)
    }

    /// Deletes a product. Lines referencing it keep their snapshot
    /// price/VAT and display "—" for the name - no cascade.
    pub fn delete_product(&mut self, id: &ProductId) -> StoreResult<()> {
        debug!(id = %id, "deleting product");
        self.products.retain(|p| &p.id != id);
        self.commit(Change::Products)
    }

    /// Inserts or replaces a document in its kind's collection.
    pub fn save_document(&mut self, doc: Document) -> StoreResult<()> {
        let kind = doc.kind();
        debug!(id = %doc.id, number = %doc.number, ?kind, "saving document");
        upsert(self.collection_mut(kind), doc, |d| d.id.clone());
        self.commit(Change::Documents(kind))
    }

    /// Deletes a document. Its number is never reissued.
    pub fn delete_document(&mut self, kind: DocKind, id: &DocumentId) -> StoreResult<()> {
        debug!(id = %id, ?kind, "deleting document");
        self.collection_mut(kind).retain(|d| &d.id != id);
        self.commit(Change::Documents(kind))
    }

    /// Inserts or replaces a template; corrupt templates are rejected.
    pub fn save_template(&mut self, template: TemplateSettings) -> StoreResult<()> {
        template.validate()?;
        debug!(id = %template.id, name = %template.name, "saving template");
        upsert(&mut self.templates, template, |t| t.id.clone());
        self.commit(Change::Templates)
    }

    pub fn delete_template(&mut self, id: &TemplateId) -> StoreResult<()> {
        debug!(id = %id, "deleting template");
        self.templates.retain(|t| &t.id != id);
        self.commit(Change::Templates)
    }

    /// Takes the next display number for a kind: "0001", "0002", …
    ///
    /// The counter only ever increases; a taken number stays consumed
    /// even if its document is later deleted.
    pub fn next_number(&mut self, kind: DocKind) -> StoreResult<String> {
        let counter = match kind {
            DocKind::Invoice => &mut self.invoice_counter,
            DocKind::Act => &mut self.act_counter,
            DocKind::Upd => &mut self.upd_counter,
        };
        let number = format_doc_number(*counter);
        *counter += 1;
        debug!(?kind, number = %number, "issued document number");
        self.persist()?;
        Ok(number)
    }

    // -- host state pass-through ----------------------------------------------

    /// Reads a host-owned key (workspace tab list, active tab id).
    /// The store does not interpret these values.
    pub fn host_get(&self, key: &str) -> Option<String> {
        debug_assert!(!keys::ALL.contains(&key), "reserved key: {key}");
        self.kv.get(key)
    }

    /// Writes a host-owned key.
    pub fn host_set(&mut self, key: &str, value: String) -> StoreResult<()> {
        debug_assert!(!keys::ALL.contains(&key), "reserved key: {key}");
        self.kv.set(key, value)
    }

    // -- change feed ----------------------------------------------------------

    /// Registers an observer called after every committed mutation.
    pub fn subscribe(&mut self, observer: impl Fn(&Change) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(sid, _)| *sid != id);
    }

    // -- internals ------------------------------------------------------------

    fn collection(&self, kind: DocKind) -> &Vec<Document> {
        match kind {
            DocKind::Invoice => &self.invoices,
            DocKind::Act => &self.acts,
            DocKind::Upd => &self.upds,
        }
    }

    fn collection_mut(&mut self, kind: DocKind) -> &mut Vec<Document> {
        match kind {
            DocKind::Invoice => &mut self.invoices,
            DocKind::Act => &mut self.acts,
            DocKind::Upd => &mut self.upds,
        }
    }

    fn commit(&mut self, change: Change) -> StoreResult<()> {
        self.persist()?;
        for (_, observer) in &self.observers {
            observer(&change);
        }
        Ok(())
    }

    /// Writes the full snapshot: every collection and counter, every
    /// time. Last write wins.
    fn persist(&mut self) -> StoreResult<()> {
        store_json(self.kv.as_mut(), keys::COMPANIES, &self.companies)?;
        store_json(self.kv.as_mut(), keys::PRODUCTS, &self.products)?;
        store_json(self.kv.as_mut(), keys::INVOICES, &self.invoices)?;
        store_json(self.kv.as_mut(), keys::ACTS, &self.acts)?;
        store_json(self.kv.as_mut(), keys::UPDS, &self.upds)?;
        store_json(self.kv.as_mut(), keys::TEMPLATES, &self.templates)?;
        store_json(self.kv.as_mut(), keys::INVOICE_COUNTER, &self.invoice_counter)?;
        store_json(self.kv.as_mut(), keys::ACT_COUNTER, &self.act_counter)?;
        store_json(self.kv.as_mut(), keys::UPD_COUNTER, &self.upd_counter)?;
        Ok(())
    }
}

fn load_or_default<T: DeserializeOwned + Default>(
    kv: &dyn KvBackend,
    key: &str,
) -> StoreResult<T> {
    match kv.get(key) {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Snapshot {
            key: key.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

fn load_counter(kv: &dyn KvBackend, key: &str) -> StoreResult<u64> {
    match kv.get(key) {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Snapshot {
            key: key.to_string(),
            source,
        }),
        None => Ok(1),
    }
}

fn store_json<T: Serialize>(kv: &mut dyn KvBackend, key: &str, value: &T) -> StoreResult<()> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Snapshot {
        key: key.to_string(),
        source,
    })?;
    kv.set(key, raw)
}

fn upsert<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
    let id = key(&item);
    match items.iter_mut().find(|existing| key(existing) == id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use chrono::NaiveDate;
    use schetovod_core::money::Money;
    use schetovod_core::types::{Currency, DocDetails, DocLine, VatRate};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn open_empty() -> Store {
        Store::open(Box::new(MemoryKv::new())).unwrap()
    }

    fn invoice(store: &mut Store, id: &str) -> Document {
        let number = store.next_number(DocKind::Invoice).unwrap();
        Document {
            id: DocumentId::new(id),
            number,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            seller_id: CompanyId::new("c1"),
            buyer_id: CompanyId::new("c2"),
            lines: vec![DocLine {
                id: format!("{id}-l1"),
                product_id: ProductId::new("p1"),
                quantity: 2,
                price: Money::from_kopecks(500_000),
                vat: VatRate::from_percent(20),
            }],
            currency: Currency::Rub,
            details: DocDetails::Invoice {},
        }
    }

    #[test]
    fn test_empty_store_is_seeded() {
        let store = open_empty();
        assert_eq!(store.companies().len(), 2);
        assert_eq!(store.products().len(), 2);
        assert_eq!(store.templates().len(), 3);
        assert!(store.template_for(DocKind::Invoice).is_some());
        assert!(store.template_for(DocKind::Upd).is_some());
    }

    #[test]
    fn test_numbering_sequence_and_no_reuse() {
        let mut store = open_empty();
        let a = invoice(&mut store, "a");
        let b = invoice(&mut store, "b");
        let c = invoice(&mut store, "c");
        assert_eq!(a.number, "0001");
        assert_eq!(b.number, "0002");
        assert_eq!(c.number, "0003");

        store.save_document(a).unwrap();
        store.save_document(b.clone()).unwrap();
        store.save_document(c).unwrap();

        // Deleting the second invoice does not give its number back.
        store.delete_document(DocKind::Invoice, &b.id).unwrap();
        let d = invoice(&mut store, "d");
        assert_eq!(d.number, "0004");
    }

    #[test]
    fn test_counters_are_per_kind() {
        let mut store = open_empty();
        assert_eq!(store.next_number(DocKind::Invoice).unwrap(), "0001");
        assert_eq!(store.next_number(DocKind::Act).unwrap(), "0001");
        assert_eq!(store.next_number(DocKind::Upd).unwrap(), "0001");
        assert_eq!(store.next_number(DocKind::Act).unwrap(), "0002");
    }

    #[test]
    fn test_product_deletion_does_not_cascade() {
        let mut store = open_empty();
        let doc = invoice(&mut store, "a");
        store.save_document(doc.clone()).unwrap();

        store.delete_product(&ProductId::new("p1")).unwrap();
        assert!(store.product(&ProductId::new("p1")).is_none());

        // The stored line still carries the frozen price and VAT.
        let kept = store.document(DocKind::Invoice, &doc.id).unwrap();
        assert_eq!(kept.lines[0].price.kopecks(), 500_000);
        assert_eq!(kept.lines[0].vat.percent(), 20);
    }

    #[test]
    fn test_migration_backfills_old_records() {
        // Snapshots written before director/accountant/unit existed.
        let kv = MemoryKv::new()
            .preload(
                keys::COMPANIES,
                r#"[{"id":"c1","name":"ООО Старая","inn":"7707123456","kpp":"",
                     "bank":"","bik":"","rs":"","ks":"","address":"","role":"seller"}]"#,
            )
            .preload(
                keys::PRODUCTS,
                r#"[{"id":"p1","name":"Услуга","price":100000,"vat":20,
                     "barcode":"","currency":"RUB"}]"#,
            );
        let store = Store::open(Box::new(kv)).unwrap();

        let company = store.company(&CompanyId::new("c1")).unwrap();
        assert_eq!(company.director, "");
        assert_eq!(company.accountant, "");
        let product = store.product(&ProductId::new("p1")).unwrap();
        assert_eq!(product.unit, "шт");
    }

    #[test]
    fn test_existing_data_is_not_reseeded() {
        let kv = MemoryKv::new().preload(
            keys::COMPANIES,
            r#"[{"id":"x","name":"ООО Одна","inn":"","kpp":"","bank":"","bik":"",
                 "rs":"","ks":"","address":"","role":"seller","director":"","accountant":""}]"#,
        );
        let store = Store::open(Box::new(kv)).unwrap();
        assert_eq!(store.companies().len(), 1);
        assert!(store.products().is_empty());
    }

    #[test]
    fn test_corrupt_template_snapshot_fails_open() {
        let kv = MemoryKv::new().preload(keys::TEMPLATES, r#"[{"id":"t1","name":"Битый"}]"#);
        assert!(matches!(
            Store::open(Box::new(kv)),
            Err(StoreError::Snapshot { .. })
        ));
    }

    #[test]
    fn test_observers_see_committed_changes() {
        let mut store = open_empty();
        let seen: Rc<RefCell<Vec<Change>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sub = store.subscribe(move |change| sink.borrow_mut().push(*change));

        let mut company = store.companies().remove(0);
        company.name = "ООО Новая".to_string();
        store.save_company(company).unwrap();
        store.delete_product(&ProductId::new("p2")).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![Change::Companies, Change::Products]
        );

        store.unsubscribe(sub);
        store.delete_product(&ProductId::new("p1")).unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_invalid_reference_data_rejected() {
        let mut store = open_empty();
        let mut company = store.companies().remove(0);
        company.inn = "123".to_string();
        assert!(matches!(
            store.save_company(company),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_save_template_validates() {
        let mut store = open_empty();
        let mut tpl = store.template_for(DocKind::Invoice).unwrap();
        tpl.font_size = 0;
        assert!(matches!(
            store.save_template(tpl),
            Err(StoreError::Template(_))
        ));
    }

    #[test]
    fn test_documents_collections_are_separate() {
        let mut store = open_empty();
        let number = store.next_number(DocKind::Act).unwrap();
        let act = Document {
            id: DocumentId::new("a1"),
            number,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            seller_id: CompanyId::new("c1"),
            buyer_id: CompanyId::new("c2"),
            lines: vec![],
            currency: Currency::Rub,
            details: DocDetails::Act {
                contract_number: String::new(),
                contract_date: None,
            },
        };
        store.save_document(act).unwrap();
        assert_eq!(store.documents(DocKind::Act).len(), 1);
        assert!(store.documents(DocKind::Invoice).is_empty());
        assert!(store
            .document_by_number(DocKind::Act, "0001")
            .is_some());
    }
}
