//! List view models
//!
//! A loaded collection plus the current search term render to a table of
//! display cells with either an empty state or a footer count.

use serde::Serialize;

use crate::models::{CostType, Lot, LotListing, Product, Role, Shipment};
use crate::search::{filter_records, Searchable};
use crate::session::Session;
use crate::types::{cell_or_dash, format_money, format_quantity, Noun};

/// User-facing texts of one record kind
#[derive(Debug, Clone, Copy)]
pub struct ResourceLabels {
    pub noun: Noun,
    /// Article and noun, e.g. "le produit", "l'expédition"
    pub subject: &'static str,
    pub page_title: &'static str,
    pub empty_title: &'static str,
    pub not_found_title: &'static str,
    pub empty_description: &'static str,
    pub create_action: &'static str,
    pub create_title: &'static str,
    pub edit_title: &'static str,
    pub delete_title: &'static str,
    pub delete_warning: &'static str,
    pub load_failed: &'static str,
    pub save_failed: &'static str,
    pub delete_failed: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
}

const SEARCH_HINT: &str = "Essayez de modifier votre recherche";

pub const PRODUCT_LABELS: ResourceLabels = ResourceLabels {
    noun: Noun::masculine("produit", "produits"),
    subject: "le produit",
    page_title: "Produits",
    empty_title: "Aucun produit",
    not_found_title: "Aucun produit trouvé",
    empty_description: "Commencez par ajouter votre premier produit au catalogue",
    create_action: "Ajouter un produit",
    create_title: "Ajouter un produit",
    edit_title: "Modifier le produit",
    delete_title: "Supprimer le produit",
    delete_warning: "Un produit ne peut pas être supprimé tant que des lots y sont rattachés.",
    load_failed: "Impossible de charger les produits",
    save_failed: "Impossible de sauvegarder le produit",
    delete_failed: "Impossible de supprimer le produit",
    created: "Le produit a été ajouté avec succès",
    updated: "Le produit a été modifié avec succès",
    deleted: "Le produit a été supprimé avec succès",
};

pub const SHIPMENT_LABELS: ResourceLabels = ResourceLabels {
    noun: Noun::feminine("expédition", "expéditions"),
    subject: "l'expédition",
    page_title: "Expéditions",
    empty_title: "Aucune expédition",
    not_found_title: "Aucune expédition trouvée",
    empty_description: "Commencez par créer votre première expédition",
    create_action: "Nouvelle expédition",
    create_title: "Nouvelle expédition",
    edit_title: "Modifier l'expédition",
    delete_title: "Supprimer l'expédition",
    delete_warning: "Une expédition ne peut pas être supprimée tant que des lots y sont rattachés.",
    load_failed: "Impossible de charger les expéditions",
    save_failed: "Impossible de sauvegarder l'expédition",
    delete_failed: "Impossible de supprimer l'expédition",
    created: "L'expédition a été créée avec succès",
    updated: "L'expédition a été modifiée avec succès",
    deleted: "L'expédition a été supprimée avec succès",
};

pub const LOT_LABELS: ResourceLabels = ResourceLabels {
    noun: Noun::masculine("lot", "lots"),
    subject: "le lot",
    page_title: "Lots physiques",
    empty_title: "Aucun lot",
    not_found_title: "Aucun lot trouvé",
    empty_description: "Commencez par créer votre premier lot",
    create_action: "Nouveau lot",
    create_title: "Nouveau lot",
    edit_title: "Modifier le lot",
    delete_title: "Supprimer le lot",
    delete_warning: "Le stock de ce lot sera retiré de l'inventaire.",
    load_failed: "Impossible de charger les lots",
    save_failed: "Impossible de sauvegarder le lot",
    delete_failed: "Impossible de supprimer le lot",
    created: "Le lot a été créé avec succès",
    updated: "Le lot a été modifié avec succès",
    deleted: "Le lot a été supprimé avec succès",
};

pub const COST_TYPE_LABELS: ResourceLabels = ResourceLabels {
    noun: Noun::masculine("type", "types"),
    subject: "le type de coût",
    page_title: "Types de coûts",
    empty_title: "Aucun type de coût",
    not_found_title: "Aucun type trouvé",
    empty_description: "Commencez par ajouter votre premier type de coût",
    create_action: "Ajouter un type",
    create_title: "Ajouter un type de coût",
    edit_title: "Modifier le type de coût",
    delete_title: "Supprimer le type de coût",
    delete_warning: "Ce type de coût ne pourra plus être utilisé pour les nouveaux calculs.",
    load_failed: "Impossible de charger les types de coûts",
    save_failed: "Impossible de sauvegarder le type de coût",
    delete_failed: "Impossible de supprimer le type de coût",
    created: "Le type de coût a été ajouté avec succès",
    updated: "Le type de coût a été modifié avec succès",
    deleted: "Le type de coût a été supprimé avec succès",
};

/// A record that renders as one table row
pub trait TableRow {
    const COLUMNS: &'static [&'static str];

    /// Stable key of the row (the record's primary key)
    fn row_key(&self) -> &str;

    fn cells(&self) -> Vec<String>;
}

/// Records that can name themselves in a deletion prompt
pub trait Identified {
    /// Main and secondary identity fields
    fn identity(&self) -> (&str, &str);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub key: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyState {
    pub title: String,
    pub description: String,
    /// Call-to-action label; absent while searching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub title: String,
    pub create_action: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub loading: bool,
}

/// Render the filtered view of a loaded collection
pub fn render_list<T>(records: &[T], search: &str, labels: &ResourceLabels) -> ListView
where
    T: Searchable + TableRow,
{
    let visible = filter_records(records, search);
    let searching = !search.trim().is_empty();

    let rows: Vec<Row> = visible
        .iter()
        .map(|record| Row {
            key: record.row_key().to_string(),
            cells: record.cells(),
        })
        .collect();

    let (empty_state, footer) = if rows.is_empty() {
        let empty = if searching {
            EmptyState {
                title: labels.not_found_title.to_string(),
                description: SEARCH_HINT.to_string(),
                action: None,
            }
        } else {
            EmptyState {
                title: labels.empty_title.to_string(),
                description: labels.empty_description.to_string(),
                action: Some(labels.create_action.to_string()),
            }
        };
        (Some(empty), None)
    } else {
        (None, Some(footer_text(labels.noun, rows.len(), records.len(), searching)))
    };

    ListView {
        title: labels.page_title.to_string(),
        create_action: labels.create_action.to_string(),
        columns: T::COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
        empty_state,
        footer,
        loading: false,
    }
}

/// "3 expéditions affichées sur 10 total"
pub fn footer_text(noun: Noun, shown: usize, total: usize, searching: bool) -> String {
    let mut text = format!("{} {}", noun.count(shown), noun.agree("affiché", shown));
    if searching {
        text.push_str(&format!(" sur {} total", total));
    }
    text
}

/// Summary shown by the deletion confirmation dialog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletePrompt {
    pub title: String,
    pub description: String,
    pub message: String,
    pub warning: String,
    /// Why the deletion cannot proceed, if it cannot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<String>,
}

pub fn delete_prompt<T: Identified>(record: &T, labels: &ResourceLabels) -> DeletePrompt {
    let (main, secondary) = record.identity();
    DeletePrompt {
        title: labels.delete_title.to_string(),
        description: "Cette action est irréversible".to_string(),
        message: format!(
            "Êtes-vous sûr de vouloir supprimer {} {} ({}) ?",
            labels.subject, main, secondary
        ),
        warning: labels.delete_warning.to_string(),
        blocked: None,
    }
}

impl TableRow for Product {
    const COLUMNS: &'static [&'static str] = &[
        "SKU",
        "Nom",
        "Catégorie",
        "Marque",
        "Statut",
        "Coût de revient",
    ];

    fn row_key(&self) -> &str {
        &self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.sku.clone(),
            self.nom.clone(),
            cell_or_dash(self.categorie.as_deref()),
            cell_or_dash(self.marque.as_deref()),
            self.statut.label().to_string(),
            format_money(self.couts.total_revient, &self.devise),
        ]
    }
}

impl Identified for Product {
    fn identity(&self) -> (&str, &str) {
        (self.nom.as_str(), self.sku.as_str())
    }
}

impl TableRow for Shipment {
    const COLUMNS: &'static [&'static str] = &[
        "Référence",
        "Fournisseur",
        "Date départ",
        "Date réception",
        "Statut",
        "Coût total",
    ];

    fn row_key(&self) -> &str {
        &self.id_expedition
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.reference.clone(),
            self.fournisseur.clone(),
            self.date_depart.format("%Y-%m-%d").to_string(),
            self.date_reception
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.statut.label().to_string(),
            format_money(self.cout_total, &self.devise),
        ]
    }
}

impl Identified for Shipment {
    fn identity(&self) -> (&str, &str) {
        (self.id_expedition.as_str(), self.reference.as_str())
    }
}

impl TableRow for LotListing {
    const COLUMNS: &'static [&'static str] = &[
        "Numéro du lot",
        "SKU physique",
        "Produit",
        "Expédition",
        "Quantité",
        "Coût unitaire",
        "Statut",
    ];

    fn row_key(&self) -> &str {
        &self.lot.id_lot
    }

    fn cells(&self) -> Vec<String> {
        let lot = &self.lot;
        vec![
            lot.id_lot.clone(),
            lot.sku_physique.clone(),
            cell_or_dash(self.product.as_ref().map(|p| p.nom.as_str())),
            self.shipment
                .as_ref()
                .map(|s| s.reference.clone())
                .unwrap_or_else(|| lot.id_expedition.clone()),
            format_quantity(lot.quantite_totale),
            format_money(lot.cout_achat_unitaire, ""),
            lot.statut.label().to_string(),
        ]
    }
}

impl Identified for Lot {
    fn identity(&self) -> (&str, &str) {
        (self.id_lot.as_str(), self.sku_physique.as_str())
    }
}

impl Identified for LotListing {
    fn identity(&self) -> (&str, &str) {
        self.lot.identity()
    }
}

impl TableRow for CostType {
    const COLUMNS: &'static [&'static str] = &[
        "Code",
        "Nom",
        "Catégorie",
        "Unité de calcul",
        "Taux par défaut",
        "Statut",
    ];

    fn row_key(&self) -> &str {
        &self.id
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.nom.clone(),
            self.categorie.label().to_string(),
            cell_or_dash(self.unite_calcul.as_deref()),
            self.taux_defaut
                .map(|t| format!("{}%", format_quantity(t)))
                .unwrap_or_else(|| "-".to_string()),
            if self.actif { "Actif" } else { "Inactif" }.to_string(),
        ]
    }
}

impl Identified for CostType {
    fn identity(&self) -> (&str, &str) {
        (self.nom.as_str(), self.code.as_str())
    }
}

// ============================================================================
// Navigation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_role: Option<Role>,
}

pub const NAVIGATION: [NavItem; 5] = [
    NavItem {
        label: "Tableau de bord",
        href: "/dashboard",
        required_role: None,
    },
    NavItem {
        label: "Produits",
        href: "/dashboard/products",
        required_role: None,
    },
    NavItem {
        label: "Expéditions",
        href: "/dashboard/shipments",
        required_role: None,
    },
    NavItem {
        label: "Lots",
        href: "/dashboard/lots",
        required_role: None,
    },
    NavItem {
        label: "Types de coûts",
        href: "/dashboard/cost-types",
        required_role: Some(Role::Admin),
    },
];

/// Sidebar entries visible to the session's role
pub fn navigation_for(session: &Session) -> Vec<NavItem> {
    NAVIGATION
        .iter()
        .filter(|item| match item.required_role {
            None => true,
            Some(role) => session.role() == Some(role),
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionUser, ShipmentStatus};
    use chrono::NaiveDate;

    fn sample_shipment() -> Shipment {
        Shipment {
            id_expedition: "EXP-2025-001".into(),
            reference: "EXP-2025-001".into(),
            fournisseur: "Sucafina".into(),
            date_depart: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            date_reception: None,
            statut: ShipmentStatus::InTransit,
            devise: "EUR".into(),
            cout_total_douane: 40.0,
            cout_total_transport: 50.0,
            cout_total_assurance: 5.0,
            cout_total_manutention: 5.0,
            cout_total: 100.0,
        }
    }

    #[test]
    fn test_empty_shipments_show_call_to_action() {
        let view = render_list::<Shipment>(&[], "", &SHIPMENT_LABELS);
        let empty = view.empty_state.unwrap();
        assert_eq!(empty.title, "Aucune expédition");
        assert_eq!(empty.action.as_deref(), Some("Nouvelle expédition"));
        assert!(view.footer.is_none());
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_empty_search_has_no_call_to_action() {
        let view = render_list(&[sample_shipment()], "rotterdam", &SHIPMENT_LABELS);
        let empty = view.empty_state.unwrap();
        assert_eq!(empty.title, "Aucune expédition trouvée");
        assert_eq!(empty.description, "Essayez de modifier votre recherche");
        assert!(empty.action.is_none());
    }

    #[test]
    fn test_sample_shipment_total_cell() {
        let view = render_list(&[sample_shipment()], "", &SHIPMENT_LABELS);
        assert_eq!(view.rows.len(), 1);
        let total_column = view.columns.iter().position(|c| c == "Coût total").unwrap();
        assert_eq!(view.rows[0].cells[total_column], "100.00 €");
        assert_eq!(view.rows[0].cells[3], "-");
        assert_eq!(view.footer.as_deref(), Some("1 expédition affichée"));
    }

    #[test]
    fn test_footer_while_searching() {
        let mut other = sample_shipment();
        other.id_expedition = "EXP-2025-002".into();
        other.reference = "MSCU7654321".into();
        let view = render_list(&[sample_shipment(), other], "mscu", &SHIPMENT_LABELS);
        assert_eq!(view.footer.as_deref(), Some("1 expédition affichée sur 2 total"));
        assert_eq!(footer_text(LOT_LABELS.noun, 3, 3, false), "3 lots affichés");
    }

    #[test]
    fn test_delete_prompt() {
        let prompt = delete_prompt(&sample_shipment(), &SHIPMENT_LABELS);
        assert_eq!(
            prompt.message,
            "Êtes-vous sûr de vouloir supprimer l'expédition EXP-2025-001 (EXP-2025-001) ?"
        );
        assert!(prompt.blocked.is_none());
        assert_eq!(
            prompt.warning,
            "Une expédition ne peut pas être supprimée tant que des lots y sont rattachés."
        );
    }

    #[test]
    fn test_restricted_kinds_warn_about_attached_lots() {
        for labels in [PRODUCT_LABELS, SHIPMENT_LABELS] {
            assert!(labels.delete_warning.contains("lots y sont rattachés"));
            assert!(!labels.delete_warning.contains("supprimées"));
        }
    }

    #[test]
    fn test_cost_types_hidden_from_non_admins() {
        let finance = Session::signed_in(SessionUser {
            id: "u-2".into(),
            email: "f@example.com".into(),
            name: "Finance".into(),
            role: Role::Finance,
        });
        let items = navigation_for(&finance);
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|i| i.href != "/dashboard/cost-types"));

        let mut admin = finance.clone();
        admin.set_user(SessionUser {
            role: Role::Admin,
            ..finance.user().unwrap().clone()
        });
        assert_eq!(navigation_for(&admin).len(), 5);
    }
}
