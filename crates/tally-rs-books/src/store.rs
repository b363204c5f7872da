//! Billing storage seam.
//!
//! [`BooksStore`] is the async trait standing in for the persistence layer;
//! forms and tenancy resolution depend only on it. [`MemoryBooks`] is the
//! in-memory reference implementation.

use std::sync::RwLock;

use async_trait::async_trait;
use tally_rs_core::TallyResult;

use crate::models::{
    Bill, BillLine, DocumentKind, DocumentLine, Estimate, EstimateLine, Invoice, InvoiceLine,
    Organization, TaxRate,
};

/// Async lookup operations over the billing data.
#[async_trait]
pub trait BooksStore: Send + Sync {
    /// Looks up an organization by primary key.
    async fn organization(&self, pk: i64) -> TallyResult<Option<Organization>>;

    /// Looks up an estimate by primary key.
    async fn estimate(&self, pk: i64) -> TallyResult<Option<Estimate>>;

    /// Looks up an invoice by primary key.
    async fn invoice(&self, pk: i64) -> TallyResult<Option<Invoice>>;

    /// Looks up a bill by primary key.
    async fn bill(&self, pk: i64) -> TallyResult<Option<Bill>>;

    /// Returns the lines of a document in insertion order.
    async fn lines_for_document(
        &self,
        kind: DocumentKind,
        document: i64,
    ) -> TallyResult<Vec<DocumentLine>>;

    /// Returns the tax rates owned by an organization.
    async fn tax_rates_for_organization(&self, organization: i64) -> TallyResult<Vec<TaxRate>>;

    /// Returns every known tax rate across organizations.
    async fn tax_rates(&self) -> TallyResult<Vec<TaxRate>>;

    /// Returns the owning organization of a document, if the document exists.
    async fn document_organization(
        &self,
        kind: DocumentKind,
        pk: i64,
    ) -> TallyResult<Option<i64>> {
        Ok(match kind {
            DocumentKind::Estimate => self.estimate(pk).await?.map(|d| d.organization),
            DocumentKind::Invoice => self.invoice(pk).await?.map(|d| d.organization),
            DocumentKind::Bill => self.bill(pk).await?.map(|d| d.organization),
        })
    }
}

/// An in-memory [`BooksStore`].
#[derive(Debug, Default)]
pub struct MemoryBooks {
    organizations: RwLock<Vec<Organization>>,
    tax_rates: RwLock<Vec<TaxRate>>,
    estimates: RwLock<Vec<Estimate>>,
    invoices: RwLock<Vec<Invoice>>,
    bills: RwLock<Vec<Bill>>,
    estimate_lines: RwLock<Vec<EstimateLine>>,
    invoice_lines: RwLock<Vec<InvoiceLine>>,
    bill_lines: RwLock<Vec<BillLine>>,
}

impl MemoryBooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an organization, assigning the next primary key, and returns it.
    pub fn add_organization(&self, mut organization: Organization) -> Organization {
        let mut rows = self
            .organizations
            .write()
            .expect("books store lock poisoned");
        let pk = rows.last().and_then(|o| o.pk).unwrap_or(0) + 1;
        organization.pk = Some(pk);
        rows.push(organization.clone());
        organization
    }

    /// Stores a tax rate, assigning the next primary key, and returns it.
    pub fn add_tax_rate(&self, mut tax_rate: TaxRate) -> TaxRate {
        let mut rows = self.tax_rates.write().expect("books store lock poisoned");
        let pk = rows.last().and_then(|t| t.pk).unwrap_or(0) + 1;
        tax_rate.pk = Some(pk);
        rows.push(tax_rate.clone());
        tax_rate
    }

    /// Stores an estimate, assigning the next primary key, and returns it.
    pub fn add_estimate(&self, mut estimate: Estimate) -> Estimate {
        let mut rows = self.estimates.write().expect("books store lock poisoned");
        let pk = rows.last().and_then(|d| d.pk).unwrap_or(0) + 1;
        estimate.pk = Some(pk);
        rows.push(estimate.clone());
        estimate
    }

    /// Stores an invoice, assigning the next primary key, and returns it.
    pub fn add_invoice(&self, mut invoice: Invoice) -> Invoice {
        let mut rows = self.invoices.write().expect("books store lock poisoned");
        let pk = rows.last().and_then(|d| d.pk).unwrap_or(0) + 1;
        invoice.pk = Some(pk);
        rows.push(invoice.clone());
        invoice
    }

    /// Stores a bill, assigning the next primary key, and returns it.
    pub fn add_bill(&self, mut bill: Bill) -> Bill {
        let mut rows = self.bills.write().expect("books store lock poisoned");
        let pk = rows.last().and_then(|d| d.pk).unwrap_or(0) + 1;
        bill.pk = Some(pk);
        rows.push(bill.clone());
        bill
    }

    /// Stores an estimate line, assigning the next primary key, and returns it.
    pub fn add_estimate_line(&self, mut line: EstimateLine) -> EstimateLine {
        let mut rows = self
            .estimate_lines
            .write()
            .expect("books store lock poisoned");
        let pk = rows.last().and_then(|l| l.pk).unwrap_or(0) + 1;
        line.pk = Some(pk);
        rows.push(line.clone());
        line
    }

    /// Stores an invoice line, assigning the next primary key, and returns it.
    pub fn add_invoice_line(&self, mut line: InvoiceLine) -> InvoiceLine {
        let mut rows = self
            .invoice_lines
            .write()
            .expect("books store lock poisoned");
        let pk = rows.last().and_then(|l| l.pk).unwrap_or(0) + 1;
        line.pk = Some(pk);
        rows.push(line.clone());
        line
    }

    /// Stores a bill line, assigning the next primary key, and returns it.
    pub fn add_bill_line(&self, mut line: BillLine) -> BillLine {
        let mut rows = self.bill_lines.write().expect("books store lock poisoned");
        let pk = rows.last().and_then(|l| l.pk).unwrap_or(0) + 1;
        line.pk = Some(pk);
        rows.push(line.clone());
        line
    }
}

#[async_trait]
impl BooksStore for MemoryBooks {
    async fn organization(&self, pk: i64) -> TallyResult<Option<Organization>> {
        let rows = self.organizations.read().expect("books store lock poisoned");
        Ok(rows.iter().find(|o| o.pk == Some(pk)).cloned())
    }

    async fn estimate(&self, pk: i64) -> TallyResult<Option<Estimate>> {
        let rows = self.estimates.read().expect("books store lock poisoned");
        Ok(rows.iter().find(|d| d.pk == Some(pk)).cloned())
    }

    async fn invoice(&self, pk: i64) -> TallyResult<Option<Invoice>> {
        let rows = self.invoices.read().expect("books store lock poisoned");
        Ok(rows.iter().find(|d| d.pk == Some(pk)).cloned())
    }

    async fn bill(&self, pk: i64) -> TallyResult<Option<Bill>> {
        let rows = self.bills.read().expect("books store lock poisoned");
        Ok(rows.iter().find(|d| d.pk == Some(pk)).cloned())
    }

    async fn lines_for_document(
        &self,
        kind: DocumentKind,
        document: i64,
    ) -> TallyResult<Vec<DocumentLine>> {
        let lines = match kind {
            DocumentKind::Estimate => {
                let rows = self
                    .estimate_lines
                    .read()
                    .expect("books store lock poisoned");
                rows.iter()
                    .filter(|l| l.estimate == document)
                    .cloned()
                    .map(DocumentLine::Estimate)
                    .collect()
            }
            DocumentKind::Invoice => {
                let rows = self
                    .invoice_lines
                    .read()
                    .expect("books store lock poisoned");
                rows.iter()
                    .filter(|l| l.invoice == document)
                    .cloned()
                    .map(DocumentLine::Invoice)
                    .collect()
            }
            DocumentKind::Bill => {
                let rows = self.bill_lines.read().expect("books store lock poisoned");
                rows.iter()
                    .filter(|l| l.bill == document)
                    .cloned()
                    .map(DocumentLine::Bill)
                    .collect()
            }
        };
        Ok(lines)
    }

    async fn tax_rates_for_organization(&self, organization: i64) -> TallyResult<Vec<TaxRate>> {
        let rows = self.tax_rates.read().expect("books store lock poisoned");
        Ok(rows
            .iter()
            .filter(|t| t.organization == organization)
            .cloned()
            .collect())
    }

    async fn tax_rates(&self) -> TallyResult<Vec<TaxRate>> {
        let rows = self.tax_rates.read().expect("books store lock poisoned");
        Ok(rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryBooks {
        let store = MemoryBooks::new();
        let acme = store.add_organization(Organization::new("Acme", "Acme Ltd"));
        let initech = store.add_organization(Organization::new("Initech", "Initech GmbH"));
        let acme_pk = acme.pk.unwrap();
        let initech_pk = initech.pk.unwrap();

        store.add_tax_rate(TaxRate::new(acme_pk, "VAT 20%", 0.20));
        store.add_tax_rate(TaxRate::new(acme_pk, "Reduced 5%", 0.05));
        store.add_tax_rate(TaxRate::new(initech_pk, "VAT 19%", 0.19));

        let invoice = store.add_invoice(Invoice::new(acme_pk, "INV-2026-0001", 1));
        let invoice_pk = invoice.pk.unwrap();
        store.add_invoice_line(InvoiceLine::new(invoice_pk, "Consulting", 650.0, 1));
        store.add_invoice_line(
            InvoiceLine::new(invoice_pk, "Hosting", 29.99, 2).with_quantity(12.0),
        );

        let bill = store.add_bill(Bill::new(initech_pk, "BILL-0007", 2));
        store.add_bill_line(BillLine::new(bill.pk.unwrap(), "Paper", 4.5, 3));

        store.add_estimate(Estimate::new(acme_pk, "EST-0001", 1));
        store
    }

    #[tokio::test]
    async fn test_organization_lookup() {
        let store = seeded();
        let org = store.organization(1).await.unwrap().unwrap();
        assert_eq!(org.display_name, "Acme");
        assert!(store.organization(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_lookup() {
        let store = seeded();
        let invoice = store.invoice(1).await.unwrap().unwrap();
        assert_eq!(invoice.number, "INV-2026-0001");
        let bill = store.bill(1).await.unwrap().unwrap();
        assert_eq!(bill.number, "BILL-0007");
        let estimate = store.estimate(1).await.unwrap().unwrap();
        assert_eq!(estimate.number, "EST-0001");
        assert!(store.invoice(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lines_for_document() {
        let store = seeded();
        let lines = store
            .lines_for_document(DocumentKind::Invoice, 1)
            .await
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].label(), "Consulting");
        assert_eq!(lines[1].label(), "Hosting");
        assert!(lines.iter().all(|l| l.kind() == DocumentKind::Invoice));

        let none = store
            .lines_for_document(DocumentKind::Estimate, 1)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_tax_rates_scoped_to_organization() {
        let store = seeded();
        let acme_rates = store.tax_rates_for_organization(1).await.unwrap();
        let names: Vec<&str> = acme_rates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["VAT 20%", "Reduced 5%"]);

        let initech_rates = store.tax_rates_for_organization(2).await.unwrap();
        assert_eq!(initech_rates.len(), 1);
        assert_eq!(initech_rates[0].name, "VAT 19%");
    }

    #[tokio::test]
    async fn test_all_tax_rates() {
        let store = seeded();
        assert_eq!(store.tax_rates().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_document_organization() {
        let store = seeded();
        assert_eq!(
            store
                .document_organization(DocumentKind::Invoice, 1)
                .await
                .unwrap(),
            Some(1)
        );
        assert_eq!(
            store
                .document_organization(DocumentKind::Bill, 1)
                .await
                .unwrap(),
            Some(2)
        );
        assert_eq!(
            store
                .document_organization(DocumentKind::Estimate, 77)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_pks() {
        let store = MemoryBooks::new();
        let a = store.add_tax_rate(TaxRate::new(1, "A", 0.1));
        let b = store.add_tax_rate(TaxRate::new(1, "B", 0.2));
        assert_eq!(a.pk, Some(1));
        assert_eq!(b.pk, Some(2));
    }
}
