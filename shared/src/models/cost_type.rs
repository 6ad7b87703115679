//! Cost type taxonomy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accounting category of a cost type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostCategory {
    #[default]
    Direct,
    Indirect,
    #[serde(rename = "Fixe")]
    Fixed,
    Variable,
}

impl CostCategory {
    pub const ALL: [CostCategory; 4] = [
        CostCategory::Direct,
        CostCategory::Indirect,
        CostCategory::Fixed,
        CostCategory::Variable,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CostCategory::Direct => "Direct",
            CostCategory::Indirect => "Indirect",
            CostCategory::Fixed => "Fixe",
            CostCategory::Variable => "Variable",
        }
    }
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A reusable cost classification entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostType {
    pub id: String,
    pub code: String,
    pub nom: String,
    #[serde(default)]
    pub description: Option<String>,
    pub categorie: CostCategory,
    #[serde(default)]
    pub unite_calcul: Option<String>,
    /// Default allocation rate in percent (0-100)
    #[serde(default)]
    pub taux_defaut: Option<f64>,
    pub actif: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
