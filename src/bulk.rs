//! One-click operations over many parameters at once.
//!
//! Targets are taken from the projected records and written through their slots, so a bulk
//! edit behaves exactly like the same edits made one row at a time.

use crate::model::{ActionCategory, DisplayType, Document, SendMode};
use crate::project::{ParameterRecord, Provenance, project};
use crate::resolve::{FlagKind, FlagValue, write_slot};
use crate::statics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Touch,
    Click,
    /// Continuous parameters (float display type).
    Analog,
    /// Everything that is not analog.
    Digital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Singleton toggles and the primary collection.
    NonExtended,
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkOp {
    SelectAll,
    ClearAll,
    Clear(Category),
    ClearScope(Scope),
    SetSendMode(SendMode),
}

impl BulkOp {
    /// Buttons offered in the bulk panel, in display order.
    pub const BUTTONS: [BulkOp; 8] = [
        BulkOp::SelectAll,
        BulkOp::ClearAll,
        BulkOp::Clear(Category::Touch),
        BulkOp::Clear(Category::Click),
        BulkOp::Clear(Category::Analog),
        BulkOp::Clear(Category::Digital),
        BulkOp::ClearScope(Scope::NonExtended),
        BulkOp::ClearScope(Scope::Extended),
    ];

    pub fn label(self) -> &'static str {
        match self {
            BulkOp::SelectAll => statics::EN_BTN_SELECT_ALL,
            BulkOp::ClearAll => statics::EN_BTN_CLEAR_ALL,
            BulkOp::Clear(Category::Touch) => statics::EN_BTN_CLEAR_TOUCH,
            BulkOp::Clear(Category::Click) => statics::EN_BTN_CLEAR_CLICK,
            BulkOp::Clear(Category::Analog) => statics::EN_BTN_CLEAR_ANALOG,
            BulkOp::Clear(Category::Digital) => statics::EN_BTN_CLEAR_DIGITAL,
            BulkOp::ClearScope(Scope::NonExtended) => statics::EN_BTN_CLEAR_PRIMARY,
            BulkOp::ClearScope(Scope::Extended) => statics::EN_BTN_CLEAR_EXTENDED,
            BulkOp::SetSendMode(mode) => mode.label(),
        }
    }

    fn selects(self, record: &ParameterRecord) -> bool {
        match self {
            BulkOp::SelectAll | BulkOp::ClearAll | BulkOp::SetSendMode(_) => true,
            BulkOp::Clear(Category::Touch) => record.category == ActionCategory::Touch,
            BulkOp::Clear(Category::Click) => record.category == ActionCategory::Click,
            BulkOp::Clear(Category::Analog) => record.display_type == DisplayType::Float,
            BulkOp::Clear(Category::Digital) => record.display_type != DisplayType::Float,
            BulkOp::ClearScope(Scope::NonExtended) => record.provenance != Provenance::Extended,
            BulkOp::ClearScope(Scope::Extended) => record.provenance == Provenance::Extended,
        }
    }

    fn assignment(self) -> (FlagKind, FlagValue) {
        match self {
            BulkOp::SelectAll => (FlagKind::Enabled, FlagValue::Bool(true)),
            BulkOp::SetSendMode(mode) => (FlagKind::AlwaysSend, FlagValue::SendMode(mode)),
            BulkOp::ClearAll | BulkOp::Clear(_) | BulkOp::ClearScope(_) => {
                (FlagKind::Enabled, FlagValue::Bool(false))
            }
        }
    }
}

/// Applies `op` to every parameter it selects and returns how many were written.
/// Vector actions are edited per position; their arity never changes.
pub fn run(doc: &mut Document, op: BulkOp) -> usize {
    let (flag, value) = op.assignment();
    let targets: Vec<_> = project(doc)
        .into_iter()
        .filter(|record| op.selects(record))
        .map(|record| record.slot)
        .collect();

    let mut written = 0;
    for slot in targets {
        match write_slot(doc, slot, flag, value) {
            Ok(()) => written += 1,
            Err(e) => log::warn!("{op:?} skipped {slot:?}: {e}"),
        }
    }
    log::info!("{op:?}: updated {written} parameters");
    written
}
