//! Line-item formsets for the billing documents.
//!
//! Each document type gets a formset over its line form. All three share
//! the same layout: the `lines` prefix, no extra blank rows, at least one
//! filled line, and a first row that may not be left empty even on a
//! fresh document.

use std::collections::HashMap;

use tally_rs_core::TallyResult;
use tally_rs_forms::fields::set_choices;
use tally_rs_forms::form::{BaseForm, Form};
use tally_rs_forms::formset::FormSet;
use tally_rs_models::value::Value;

use crate::forms::{generate_line_fields, line_initial, restrict_to_organization, tax_rate_choices};
use crate::models::{Bill, DocumentKind, Estimate, Invoice};
use crate::store::BooksStore;

/// The form prefix shared by all line formsets.
pub const LINE_PREFIX: &str = "lines";

/// Builds the line formset for one document type.
///
/// With a stored parent document, its lines seed the initial rows and the
/// tax-rate choices narrow to the owning organization's rates. Rows added
/// beyond the stored lines offer the open rate list, like a blank line
/// form.
pub async fn line_formset(
    kind: DocumentKind,
    store: &dyn BooksStore,
    document: Option<i64>,
) -> TallyResult<FormSet> {
    let lines = match document {
        Some(pk) => store.lines_for_document(kind, pk).await?,
        None => Vec::new(),
    };

    // Choice lists are resolved up front so the row factory stays
    // synchronous. All lines share one parent, so one narrowed list covers
    // every initial row.
    let narrowed = match lines.first() {
        Some(line) => tax_rate_choices(&restrict_to_organization(store, line).await?),
        None => Vec::new(),
    };
    let open = tax_rate_choices(&store.tax_rates().await?);
    let initials: Vec<HashMap<String, Value>> = lines.iter().map(line_initial).collect();
    let initial_count = initials.len();

    let factory = move |index: usize| -> Box<dyn Form> {
        let mut fields = generate_line_fields(kind);
        let choices = if index < initial_count {
            narrowed.clone()
        } else {
            open.clone()
        };
        if let Some(field) = fields.iter_mut().find(|f| f.name == "tax_rate") {
            set_choices(field, choices);
        }
        let mut form = BaseForm::new(fields);
        if let Some(initial) = initials.get(index) {
            form = form.with_initial(initial.clone());
        }
        Box::new(form)
    };

    Ok(FormSet::new(factory)
        .with_prefix(LINE_PREFIX)
        .with_initial_count(initial_count)
        .with_extra(0)
        .with_min_num(1)
        .required_first())
}

/// Builds the estimate-line formset.
///
/// Estimate lines cannot be narrowed to an organization, so a stored
/// estimate that already has lines fails with the unsupported-model error.
pub async fn estimate_line_formset(
    store: &dyn BooksStore,
    estimate: Option<&Estimate>,
) -> TallyResult<FormSet> {
    line_formset(DocumentKind::Estimate, store, estimate.and_then(|d| d.pk)).await
}

/// Builds the invoice-line formset.
pub async fn invoice_line_formset(
    store: &dyn BooksStore,
    invoice: Option<&Invoice>,
) -> TallyResult<FormSet> {
    line_formset(DocumentKind::Invoice, store, invoice.and_then(|d| d.pk)).await
}

/// Builds the bill-line formset.
pub async fn bill_line_formset(store: &dyn BooksStore, bill: Option<&Bill>) -> TallyResult<FormSet> {
    line_formset(DocumentKind::Bill, store, bill.and_then(|d| d.pk)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillLine, EstimateLine, InvoiceLine, Organization, TaxRate};
    use crate::store::MemoryBooks;
    use std::sync::Arc;
    use tally_rs_core::TallyError;
    use tally_rs_forms::data::FormData;

    fn seeded() -> Arc<MemoryBooks> {
        let store = MemoryBooks::new();
        store.add_organization(Organization::new("Acme", "Acme Ltd"));
        store.add_organization(Organization::new("Initech", "Initech GmbH"));
        store.add_tax_rate(TaxRate::new(1, "VAT 20%", 0.20));
        store.add_tax_rate(TaxRate::new(1, "Reduced 5%", 0.05));
        store.add_tax_rate(TaxRate::new(2, "VAT 19%", 0.19));
        store.add_invoice(Invoice::new(1, "INV-2026-0001", 1));
        store.add_bill(Bill::new(2, "BILL-0007", 2));
        store.add_estimate(Estimate::new(1, "EST-0001", 1));
        Arc::new(store)
    }

    fn rate_choice_count(formset: &FormSet, row: usize) -> usize {
        formset.forms()[row]
            .fields()
            .iter()
            .find(|f| f.name == "tax_rate")
            .and_then(|f| f.choices())
            .map_or(0, <[(String, String)]>::len)
    }

    #[tokio::test]
    async fn test_blank_formset_shows_one_required_row() {
        let store = seeded();
        let fs = invoice_line_formset(store.as_ref(), None).await.unwrap();
        assert_eq!(fs.prefix(), LINE_PREFIX);
        assert_eq!(fs.total_form_count(), 1);
        assert!(!fs.forms()[0].empty_permitted());
        // No parent, so the open rate list applies
        assert_eq!(rate_choice_count(&fs, 0), 3);
    }

    #[tokio::test]
    async fn test_formset_accepts_one_filled_line() {
        let store = seeded();
        let mut fs = invoice_line_formset(store.as_ref(), None).await.unwrap();
        fs.bind(&FormData::parse(
            "lines-TOTAL_FORMS=1&lines-INITIAL_FORMS=0\
             &lines-0-label=Consulting&lines-0-description=\
             &lines-0-unit_price_excl_tax=650.00&lines-0-quantity=3&lines-0-tax_rate=1",
        ));
        assert!(fs.is_valid().await, "errors: {:?}", fs.non_form_errors());
        assert_eq!(
            fs.forms()[0].cleaned_data().get("quantity"),
            Some(&Value::Float(3.0))
        );
        assert_eq!(
            fs.forms()[0].cleaned_data().get("tax_rate"),
            Some(&Value::Int(1))
        );
    }

    #[tokio::test]
    async fn test_formset_rejects_blank_submission() {
        let store = seeded();
        let mut fs = bill_line_formset(store.as_ref(), None).await.unwrap();
        fs.bind(&FormData::parse(
            "lines-TOTAL_FORMS=1&lines-INITIAL_FORMS=0\
             &lines-0-label=&lines-0-description=\
             &lines-0-unit_price_excl_tax=&lines-0-quantity=&lines-0-tax_rate=",
        ));
        assert!(!fs.is_valid().await);
        assert!(fs.forms()[0].errors().contains_key("label"));
        assert!(fs.forms()[0].errors().contains_key("unit_price_excl_tax"));
        assert!(fs.non_form_errors()[0].contains("at least 1"));
    }

    #[tokio::test]
    async fn test_formset_rejects_zero_rows() {
        let store = seeded();
        let mut fs = estimate_line_formset(store.as_ref(), None).await.unwrap();
        fs.bind(&FormData::parse("lines-TOTAL_FORMS=0&lines-INITIAL_FORMS=0"));
        assert!(!fs.is_valid().await);
        assert_eq!(fs.non_form_errors()[0], "Please submit at least 1 forms.");
    }

    #[tokio::test]
    async fn test_formset_seeds_rows_from_stored_lines() {
        let store = seeded();
        store.add_invoice_line(InvoiceLine::new(1, "Consulting", 650.0, 1).with_quantity(3.0));
        store.add_invoice_line(InvoiceLine::new(1, "Hosting", 29.99, 2).with_quantity(12.0));
        let invoice = store.invoice(1).await.unwrap().unwrap();

        let fs = invoice_line_formset(store.as_ref(), Some(&invoice))
            .await
            .unwrap();
        assert_eq!(fs.total_form_count(), 2);
        assert_eq!(fs.initial_form_count(), 2);
        assert!(!fs.forms()[1].empty_permitted());
        assert_eq!(
            fs.forms()[0].initial().get("label"),
            Some(&Value::String("Consulting".into()))
        );
        // Initial rows narrow to the owning organization's rates
        assert_eq!(rate_choice_count(&fs, 0), 2);
        assert_eq!(rate_choice_count(&fs, 1), 2);
    }

    #[tokio::test]
    async fn test_formset_added_row_offers_open_rates() {
        let store = seeded();
        store.add_invoice_line(InvoiceLine::new(1, "Consulting", 650.0, 1).with_quantity(3.0));
        let invoice = store.invoice(1).await.unwrap().unwrap();

        let mut fs = invoice_line_formset(store.as_ref(), Some(&invoice))
            .await
            .unwrap();
        // The page grew by one row before submitting
        fs.bind(&FormData::parse(
            "lines-TOTAL_FORMS=2&lines-INITIAL_FORMS=1\
             &lines-0-label=Consulting&lines-0-description=\
             &lines-0-unit_price_excl_tax=650&lines-0-quantity=3&lines-0-tax_rate=1\
             &lines-1-label=Travel&lines-1-description=\
             &lines-1-unit_price_excl_tax=120&lines-1-quantity=1&lines-1-tax_rate=3",
        ));
        assert_eq!(rate_choice_count(&fs, 0), 2);
        assert_eq!(rate_choice_count(&fs, 1), 3);
        assert!(fs.is_valid().await, "errors: {:?}", fs.non_form_errors());
        assert_eq!(
            fs.forms()[1].cleaned_data().get("tax_rate"),
            Some(&Value::Int(3))
        );
    }

    #[tokio::test]
    async fn test_bill_formset_narrows_to_owning_organization() {
        let store = seeded();
        store.add_bill_line(BillLine::new(1, "Paper", 4.5, 3));
        let bill = store.bill(1).await.unwrap().unwrap();

        let fs = bill_line_formset(store.as_ref(), Some(&bill)).await.unwrap();
        // The bill belongs to the second organization, which has one rate
        assert_eq!(rate_choice_count(&fs, 0), 1);
    }

    #[tokio::test]
    async fn test_estimate_formset_with_stored_lines_is_unsupported() {
        let store = seeded();
        store.add_estimate_line(EstimateLine::new(1, "Sketches", 120.0, 1));
        let estimate = store.estimate(1).await.unwrap().unwrap();

        let err = estimate_line_formset(store.as_ref(), Some(&estimate))
            .await
            .unwrap_err();
        assert!(matches!(err, TallyError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_unsaved_document_gets_a_blank_formset() {
        let store = seeded();
        let unsaved = Invoice::new(1, "INV-2026-0009", 1);
        let fs = invoice_line_formset(store.as_ref(), Some(&unsaved))
            .await
            .unwrap();
        assert_eq!(fs.initial_form_count(), 0);
        assert_eq!(fs.total_form_count(), 1);
    }
}
