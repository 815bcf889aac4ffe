//! Flattens the document into one record per editable parameter.
//!
//! Records are a derived view: they are rebuilt from the document on demand and every
//! record carries the [`Slot`] it was read from, so edits never go through a copy.

use crate::model::{
    ActionCategory, Collection, ComponentFlags, DisplayType, Document, SendMode, SingletonToggle,
};
use crate::resolve::{FlagKind, FlagValue, Slot};
use crate::statics;

/// Which part of the document a record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Singleton,
    Primary,
    Extended,
}

impl Provenance {
    pub fn label(self) -> &'static str {
        match self {
            Provenance::Singleton => statics::EN_SOURCE_SINGLETON,
            Provenance::Primary => statics::EN_SOURCE_PRIMARY,
            Provenance::Extended => statics::EN_SOURCE_EXTENDED,
        }
    }
}

impl From<Collection> for Provenance {
    fn from(collection: Collection) -> Self {
        match collection {
            Collection::Primary => Provenance::Primary,
            Collection::Extended => Provenance::Extended,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedValue {
    Unset,
    Value(f64),
    /// Computed at runtime from the paired axis; shown but never edited.
    Derived,
}

impl FixedValue {
    fn from_flags(flags: &ComponentFlags) -> Self {
        match flags.fixed_value {
            _ if flags.is_derived() => FixedValue::Derived,
            Some(v) => FixedValue::Value(v),
            None => FixedValue::Unset,
        }
    }
}

/// One row of the parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    pub name: String,
    pub slot: Slot,
    pub provenance: Provenance,
    pub category: ActionCategory,
    pub display_type: DisplayType,
    pub enabled: bool,
    pub send_mode: SendMode,
    pub unsigned: bool,
    pub binary: bool,
    pub fixed_value: FixedValue,
    pub floating: Option<f64>,
    pub annotation: Option<&'static str>,
}

impl ParameterRecord {
    fn toggle(toggle: &SingletonToggle) -> Self {
        let id = toggle.id;
        Self {
            name: id.name().to_string(),
            slot: Slot::Toggle(id),
            provenance: Provenance::Singleton,
            category: ActionCategory::Other,
            display_type: id.display_type(),
            enabled: toggle.enabled,
            send_mode: toggle.send_mode,
            unsigned: false,
            binary: false,
            fixed_value: FixedValue::Unset,
            floating: None,
            annotation: None,
        }
    }

    /// Whether `flag` can be edited on this row.
    pub fn supports(&self, flag: FlagKind) -> bool {
        match flag {
            FlagKind::Enabled | FlagKind::AlwaysSend => true,
            FlagKind::Unsigned | FlagKind::BinaryEncoded | FlagKind::Floating => {
                self.provenance != Provenance::Singleton
            }
            FlagKind::FixedValue => {
                self.display_type == DisplayType::Float && self.fixed_value != FixedValue::Derived
            }
        }
    }

    /// Current value of `flag`, as an edit event would carry it.
    pub fn flag(&self, flag: FlagKind) -> Option<FlagValue> {
        match flag {
            FlagKind::Enabled => Some(FlagValue::Bool(self.enabled)),
            FlagKind::AlwaysSend => Some(FlagValue::SendMode(self.send_mode)),
            FlagKind::Unsigned if self.provenance != Provenance::Singleton => {
                Some(FlagValue::Bool(self.unsigned))
            }
            FlagKind::BinaryEncoded if self.provenance != Provenance::Singleton => {
                Some(FlagValue::Bool(self.binary))
            }
            FlagKind::FixedValue => match self.fixed_value {
                FixedValue::Value(v) => Some(FlagValue::Number(v)),
                FixedValue::Unset | FixedValue::Derived => None,
            },
            FlagKind::Floating => self.floating.map(FlagValue::Number),
            FlagKind::Unsigned | FlagKind::BinaryEncoded => None,
        }
    }
}

/// Every editable parameter: singleton toggles in their fixed order, then each primary action
/// (vector positions in order), then each extended action.
pub fn project(doc: &Document) -> Vec<ParameterRecord> {
    let mut records: Vec<ParameterRecord> =
        doc.toggles.iter().map(ParameterRecord::toggle).collect();

    for collection in Collection::ALL {
        for (index, action) in doc.collection(collection).iter().enumerate() {
            for (component, name, flags) in action.binding.iter() {
                let fixed_value = FixedValue::from_flags(flags);
                records.push(ParameterRecord {
                    name: name.to_string(),
                    slot: Slot::Component {
                        collection,
                        action: index,
                        component,
                    },
                    provenance: collection.into(),
                    category: action.category,
                    display_type: action.display_type(component),
                    enabled: flags.enabled,
                    send_mode: flags.send_mode,
                    unsigned: flags.unsigned,
                    binary: flags.binary,
                    fixed_value,
                    floating: flags.floating,
                    annotation: (fixed_value == FixedValue::Derived)
                        .then_some(statics::EN_ANNOTATION_DERIVED),
                });
            }
        }
    }

    records
}

/// Markdown tables of the parameter names and their OSC types, grouped the way avatar
/// creators usually document them: controller inputs, trackers, then extended inputs.
pub fn records_markdown(records: &[ParameterRecord]) -> String {
    let is_tracker = |r: &&ParameterRecord| r.name.contains(statics::TRACKER_MARKER);

    let controller: Vec<&ParameterRecord> = records
        .iter()
        .filter(|r| r.provenance != Provenance::Extended)
        .filter(|r| !is_tracker(r))
        .collect();
    let trackers: Vec<&ParameterRecord> = records
        .iter()
        .filter(|r| r.provenance != Provenance::Extended)
        .filter(is_tracker)
        .collect();
    let extended: Vec<&ParameterRecord> = records
        .iter()
        .filter(|r| r.provenance == Provenance::Extended)
        .collect();

    let mut sections = Vec::new();
    for (heading, rows) in [
        (statics::EN_MD_CONTROLLER, controller),
        (statics::EN_MD_TRACKER, trackers),
        (statics::EN_MD_EXTENDED, extended),
    ] {
        if rows.is_empty() {
            continue;
        }
        let mut table = format!(
            "{heading}\n\n| {} | {} |\n| --- | --- |\n",
            statics::EN_COL_NAME,
            statics::EN_COL_TYPE
        );
        for record in rows {
            table.push_str(&format!(
                "| {} | {} |\n",
                record.name,
                record.display_type.label()
            ));
        }
        sections.push(table);
    }
    sections.join("\n")
}
