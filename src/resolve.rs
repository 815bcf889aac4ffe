//! Locating and mutating the storage slot behind a parameter name.

use crate::error::EditError;
use crate::model::{
    Collection, Component, ConnectionField, DisplayType, Document, SendMode, ToggleId,
};
use crate::statics;
use std::fmt;

/// Which flag of a parameter an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Enabled,
    AlwaysSend,
    Unsigned,
    BinaryEncoded,
    FixedValue,
    Floating,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlagKind::Enabled => "enabled",
            FlagKind::AlwaysSend => "send mode",
            FlagKind::Unsigned => "unsigned",
            FlagKind::BinaryEncoded => "binary",
            FlagKind::FixedValue => "fixed value",
            FlagKind::Floating => "hold time",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    SendMode(SendMode),
    Number(f64),
}

/// Where a parameter lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Toggle(ToggleId),
    Component {
        collection: Collection,
        action: usize,
        component: Component,
    },
}

/// Finds the slot for `name`: singleton toggles first, then the primary collection, then the
/// extended one. Names match exactly and case-sensitively; the first hit wins.
pub fn resolve(doc: &Document, name: &str) -> Option<Slot> {
    if let Some(id) = ToggleId::from_name(name) {
        return doc.toggle(id).map(|_| Slot::Toggle(id));
    }

    Collection::ALL.into_iter().find_map(|collection| {
        doc.collection(collection)
            .iter()
            .enumerate()
            .find_map(|(action, entry)| {
                entry
                    .binding
                    .position_of(name)
                    .map(|component| Slot::Component {
                        collection,
                        action,
                        component,
                    })
            })
    })
}

/// Resolves `name` and writes `value` into its `flag`. Vector actions only change the
/// position that matched.
pub fn apply(
    doc: &mut Document,
    name: &str,
    flag: FlagKind,
    value: FlagValue,
) -> Result<Slot, EditError> {
    let slot = resolve(doc, name).ok_or_else(|| EditError::SlotNotFound(name.to_string()))?;
    write_slot(doc, slot, flag, value)?;
    Ok(slot)
}

/// Writes one flag of an already resolved slot. Single edits and bulk operations both end here.
pub fn write_slot(
    doc: &mut Document,
    slot: Slot,
    flag: FlagKind,
    value: FlagValue,
) -> Result<(), EditError> {
    match slot {
        Slot::Toggle(id) => {
            let toggle = doc
                .toggle_mut(id)
                .ok_or_else(|| EditError::SlotNotFound(id.name().to_string()))?;
            let name = id.name();
            match flag {
                FlagKind::Enabled => toggle.enabled = expect_bool(value, name, flag)?,
                FlagKind::AlwaysSend => toggle.send_mode = expect_send_mode(value, name, flag)?,
                _ => {
                    return Err(EditError::NotApplicable {
                        name: name.to_string(),
                        flag,
                    });
                }
            }
            log::debug!("{name}: {flag} = {value:?}");
        }
        Slot::Component {
            collection,
            action,
            component,
        } => {
            let missing = || EditError::SlotNotFound(format!("{}[{action}]", collection.key()));
            let entry = doc
                .collection_mut(collection)
                .get_mut(action)
                .ok_or_else(missing)?;
            let display_type = entry.display_type(component);
            let name = entry
                .binding
                .parameter(component)
                .ok_or_else(missing)?
                .to_string();
            let flags = entry
                .binding
                .component_mut(component)
                .ok_or_else(missing)?;

            match flag {
                FlagKind::Enabled => flags.enabled = expect_bool(value, &name, flag)?,
                FlagKind::AlwaysSend => flags.send_mode = expect_send_mode(value, &name, flag)?,
                FlagKind::Unsigned => flags.unsigned = expect_bool(value, &name, flag)?,
                FlagKind::BinaryEncoded => flags.binary = expect_bool(value, &name, flag)?,
                FlagKind::FixedValue => {
                    if display_type != DisplayType::Float {
                        return Err(EditError::NotApplicable { name, flag });
                    }
                    let v = expect_number(value, &name, flag)?;
                    if flags.is_derived() {
                        return Err(EditError::DerivedComponent(name));
                    }
                    if v == statics::DERIVED_SENTINEL {
                        return Err(EditError::ReservedSentinel { name, value: v });
                    }
                    flags.fixed_value = Some(v);
                }
                FlagKind::Floating => flags.floating = Some(expect_number(value, &name, flag)?),
            }
            log::debug!("{name}: {flag} = {value:?}");
        }
    }
    Ok(())
}

/// Applies raw text typed into a numeric flag field, after format cleaning.
pub fn commit_flag_text(
    doc: &mut Document,
    name: &str,
    flag: FlagKind,
    text: &str,
) -> Result<Slot, EditError> {
    match flag {
        FlagKind::FixedValue | FlagKind::Floating => {
            apply(doc, name, flag, FlagValue::Number(parse_decimal_text(text)))
        }
        _ => Err(EditError::ValueMismatch {
            name: name.to_string(),
            flag,
        }),
    }
}

/// Stores a connection setting typed as text and returns the text the field should show.
/// The host is kept verbatim; numeric settings lose every non-digit character.
pub fn commit_connection(doc: &mut Document, field: ConnectionField, text: &str) -> String {
    if field == ConnectionField::Host {
        doc.connection.host = text.to_string();
        return text.to_string();
    }
    let cleaned = clean_integer_text(text);
    doc.connection.set_integer(field, parse_integer_text(&cleaned));
    cleaned
}

fn expect_bool(value: FlagValue, name: &str, flag: FlagKind) -> Result<bool, EditError> {
    match value {
        FlagValue::Bool(b) => Ok(b),
        _ => Err(mismatch(name, flag)),
    }
}

fn expect_send_mode(value: FlagValue, name: &str, flag: FlagKind) -> Result<SendMode, EditError> {
    match value {
        FlagValue::SendMode(mode) => Ok(mode),
        // Legacy events carry a plain checkbox state.
        FlagValue::Bool(true) => Ok(SendMode::Always),
        FlagValue::Bool(false) => Ok(SendMode::OnChange),
        FlagValue::Number(_) => Err(mismatch(name, flag)),
    }
}

fn expect_number(value: FlagValue, name: &str, flag: FlagKind) -> Result<f64, EditError> {
    match value {
        FlagValue::Number(v) if v.is_finite() => Ok(v),
        _ => Err(mismatch(name, flag)),
    }
}

fn mismatch(name: &str, flag: FlagKind) -> EditError {
    EditError::ValueMismatch {
        name: name.to_string(),
        flag,
    }
}

/// Keeps only ASCII digits.
pub fn clean_integer_text(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Keeps digits, a leading minus sign and the first decimal point.
pub fn clean_decimal_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut seen_point = false;
    for ch in text.chars() {
        match ch {
            '0'..='9' => out.push(ch),
            '-' if out.is_empty() => out.push(ch),
            '.' if !seen_point => {
                seen_point = true;
                out.push(ch);
            }
            _ => {}
        }
    }
    out
}

/// Parses integer field text; empty input is zero and overflow saturates.
pub fn parse_integer_text(text: &str) -> i64 {
    let cleaned = clean_integer_text(text);
    if cleaned.is_empty() {
        return 0;
    }
    cleaned.parse().unwrap_or(i64::MAX)
}

/// Parses decimal field text; empty or sign-only input is zero.
pub fn parse_decimal_text(text: &str) -> f64 {
    let cleaned = clean_decimal_text(text);
    match cleaned.as_str() {
        "" | "-" | "." | "-." => 0.0,
        s => s.parse().unwrap_or(0.0),
    }
}
