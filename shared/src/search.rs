//! Local search filter over loaded collections
//!
//! The filtered view is always derived from the cached collection and the
//! current term; the collection itself is never modified.

use crate::models::{CostType, LotListing, Product, Shipment};

/// Records that can be matched by the list search box
pub trait Searchable {
    /// Values of the designated search fields; absent optional fields are skipped
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Filter a collection by a case-insensitive substring
///
/// A blank term returns the whole collection in its original order.
pub fn filter_records<'a, T: Searchable>(records: &'a [T], term: &str) -> Vec<&'a T> {
    if term.trim().is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|record| record.matches(term)).collect()
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.nom.as_str(), self.sku.as_str()];
        if let Some(categorie) = &self.categorie {
            fields.push(categorie.as_str());
        }
        fields.push(self.barcode.as_str());
        fields
    }
}

impl Searchable for Shipment {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id_expedition.as_str(),
            self.reference.as_str(),
            self.fournisseur.as_str(),
            self.statut.label(),
        ]
    }
}

impl Searchable for LotListing {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.lot.id_lot.as_str(),
            self.lot.sku_physique.as_str(),
            self.lot.id_expedition.as_str(),
        ];
        if let Some(product) = &self.product {
            fields.push(product.nom.as_str());
        }
        fields.push(self.lot.statut.label());
        fields
    }
}

impl Searchable for CostType {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nom.as_str(), self.code.as_str(), self.categorie.label()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lot, LotStatus, ProductRef};
    use proptest::prelude::*;

    struct Named(String, String);

    impl Searchable for Named {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.0.as_str(), self.1.as_str()]
        }
    }

    fn lot_listing(id: &str, product_name: Option<&str>) -> LotListing {
        LotListing {
            lot: Lot {
                id_lot: id.to_string(),
                id_produit: "p-1".into(),
                id_expedition: "EXP-1".into(),
                sku_physique: format!("PHY-{}", id),
                cout_achat_unitaire: 2.0,
                quantite_totale: 10.0,
                poids_total_kg: None,
                volume_total_m3: None,
                date_peremption: None,
                statut: LotStatus::InStock,
            },
            product: product_name.map(|nom| ProductRef {
                id: "p-1".into(),
                sku: "SKU-1".into(),
                nom: nom.to_string(),
            }),
            shipment: None,
        }
    }

    #[test]
    fn test_lot_matches_on_related_product_name() {
        let lots = vec![lot_listing("L1", Some("Arabica Huila")), lot_listing("L2", None)];
        let found = filter_records(&lots, "huila");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].lot.id_lot, "L1");
    }

    #[test]
    fn test_lot_matches_on_status_label() {
        let lots = vec![lot_listing("L1", None)];
        assert_eq!(filter_records(&lots, "en stock").len(), 1);
    }

    #[test]
    fn test_whitespace_term_returns_everything() {
        let records = vec![Named("a".into(), "b".into()), Named("c".into(), "d".into())];
        assert_eq!(filter_records(&records, "   ").len(), 2);
    }

    #[test]
    fn test_case_insensitive() {
        let records = vec![Named("Expédition Anvers".into(), "X".into())];
        assert_eq!(filter_records(&records, "ANVERS").len(), 1);
        assert_eq!(filter_records(&records, "rotterdam").len(), 0);
    }

    proptest! {
        #[test]
        fn test_filter_is_matching_subset(
            pairs in prop::collection::vec(("[a-zA-Z ]{0,8}", "[a-zA-Z0-9]{0,8}"), 0..20),
            term in "[a-zA-Z]{1,3}",
        ) {
            let records: Vec<Named> = pairs.into_iter().map(|(a, b)| Named(a, b)).collect();
            let found = filter_records(&records, &term);
            prop_assert!(found.len() <= records.len());
            let needle = term.to_lowercase();
            for record in &found {
                prop_assert!(record
                    .search_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle)));
            }
            let expected = records.iter().filter(|r| r.matches(&term)).count();
            prop_assert_eq!(found.len(), expected);
        }

        #[test]
        fn test_empty_term_preserves_order(
            names in prop::collection::vec("[a-z]{0,6}", 0..20),
        ) {
            let records: Vec<Named> = names.into_iter().map(|n| Named(n, String::new())).collect();
            let found = filter_records(&records, "");
            prop_assert_eq!(found.len(), records.len());
            for (a, b) in found.iter().zip(records.iter()) {
                prop_assert!(std::ptr::eq(*a, b));
            }
        }
    }
}
