//! JSON-Modell eines Trello-Board-Exports
//!
//! Nur die Felder, die fuer Folien gebraucht werden. Alles andere im Export
//! wird von serde ignoriert; fehlende Listen gelten als leer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    pub lists: Vec<Liste>,
    pub cards: Vec<Karte>,
    pub checklists: Vec<Checkliste>,
    pub custom_fields: Vec<CustomField>,
    pub labels: Vec<Label>,
}

impl Board {
    /// Sucht ein Board-Label ohne Beachtung der Gross-/Kleinschreibung
    pub fn label_nach_name(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Liste {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Karte {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub id_list: String,
    pub labels: Vec<Label>,
    pub attachments: Vec<Anhang>,
    pub id_checklists: Vec<String>,
    pub custom_field_items: Vec<CustomFieldItem>,
}

impl Karte {
    pub fn hat_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Anhang {
    pub mime_type: Option<String>,
    pub previews: Vec<Vorschau>,
}

/// Vorschaubild eines Anhangs in einer bestimmten Groesse
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vorschau {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Checkliste {
    pub id: String,
    pub name: String,
    pub check_items: Vec<ChecklistEintrag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistEintrag {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomFieldItem {
    pub id_custom_field: String,
    pub value: Option<CustomFieldWert>,
}

/// Wert eines Checkbox-Feldes; Trello liefert `checked` als String
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFieldWert {
    pub checked: Option<String>,
}
