use pretty_assertions::assert_eq;
use std::path::Path;
use thumbparams_editor::bulk::{self, BulkOp, Category, Scope};
use thumbparams_editor::model::{Binding, Collection, DisplayType, SendMode};
use thumbparams_editor::project::{FixedValue, Provenance};
use thumbparams_editor::resolve::{apply, resolve};
use thumbparams_editor::{
    ConfigValue, Document, EditError, FlagKind, FlagValue, LoadedConfig, ParameterRecord, project,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn load(text: &str) -> Result<Document> {
    Ok(Document::load(ConfigValue::parse(text)?)?)
}

fn fixture_document(name: &str) -> Result<Document> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name);
    Ok(LoadedConfig::load_path(&path)?.document)
}

fn arities(doc: &Document) -> Vec<(usize, usize)> {
    Collection::ALL
        .into_iter()
        .flat_map(|c| doc.collection(c).iter())
        .map(|a| (a.binding.parameters().len(), a.binding.components().len()))
        .collect()
}

#[test]
fn scalar_and_vector_edits_stay_independent() -> Result<()> {
    let mut doc = load(
        r#"{
            "IP": "127.0.0.1", "Port": 9000, "PollingRate": 60, "StickMoveTolerance": 5,
            "actions": [
                { "type": "boolean", "osc_parameter": "A", "enabled": false },
                { "type": "vector2", "osc_parameter": ["B_x", "B_y"], "enabled": [true, true] }
            ]
        }"#,
    )?;

    apply(&mut doc, "A", FlagKind::Enabled, FlagValue::Bool(true))?;
    apply(&mut doc, "B_x", FlagKind::Enabled, FlagValue::Bool(false))?;

    let enabled: Vec<(String, bool)> = project(&doc)
        .into_iter()
        .map(|r| (r.name, r.enabled))
        .collect();
    assert_eq!(
        enabled,
        vec![
            ("A".to_string(), true),
            ("B_x".to_string(), false),
            ("B_y".to_string(), true),
        ]
    );
    Ok(())
}

#[test]
fn bulk_send_mode_reaches_every_vector_component() -> Result<()> {
    let mut doc = load(
        r#"{
            "IP": "127.0.0.1", "Port": 9000, "PollingRate": 60, "StickMoveTolerance": 5,
            "actions": [
                { "type": "vector2", "osc_parameter": ["X", "Y", "Moved"],
                  "enabled": [true, true, true], "always": [0, 0, 0] }
            ]
        }"#,
    )?;

    bulk::run(&mut doc, BulkOp::SetSendMode(SendMode::Always));

    let records = project(&doc);
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].display_type, DisplayType::Boolean);
    assert!(records.iter().all(|r| r.send_mode == SendMode::Always));
    Ok(())
}

#[test]
fn documents_without_extended_collection_project_primary_only() -> Result<()> {
    let doc = fixture_document("config_legacy.json")?;
    assert!(doc.extended.is_none());

    let records = project(&doc);
    assert_eq!(records.len(), 10);
    assert!(records.iter().all(|r| r.provenance != Provenance::Extended));

    // Extended-only bulk operations have nothing to do.
    let mut cleared = doc.clone();
    assert_eq!(bulk::run(&mut cleared, BulkOp::ClearScope(Scope::Extended)), 0);
    assert_eq!(cleared, doc);
    Ok(())
}

const ALL_FLAGS: [FlagKind; 6] = [
    FlagKind::Enabled,
    FlagKind::AlwaysSend,
    FlagKind::Unsigned,
    FlagKind::BinaryEncoded,
    FlagKind::FixedValue,
    FlagKind::Floating,
];

/// A value for `flag` that differs from the record's current one, and the record as it should
/// read after writing it.
fn changed(record: &ParameterRecord, flag: FlagKind) -> (FlagValue, ParameterRecord) {
    let mut expected = record.clone();
    let value = match flag {
        FlagKind::Enabled => {
            expected.enabled = !record.enabled;
            FlagValue::Bool(expected.enabled)
        }
        FlagKind::AlwaysSend => {
            let mode = SendMode::ALL
                .into_iter()
                .find(|mode| *mode != record.send_mode)
                .unwrap_or_default();
            expected.send_mode = mode;
            FlagValue::SendMode(mode)
        }
        FlagKind::Unsigned => {
            expected.unsigned = !record.unsigned;
            FlagValue::Bool(expected.unsigned)
        }
        FlagKind::BinaryEncoded => {
            expected.binary = !record.binary;
            FlagValue::Bool(expected.binary)
        }
        FlagKind::FixedValue => {
            let v = match record.fixed_value {
                FixedValue::Value(v) => v + 0.25,
                FixedValue::Unset | FixedValue::Derived => 0.25,
            };
            expected.fixed_value = FixedValue::Value(v);
            FlagValue::Number(v)
        }
        FlagKind::Floating => {
            let v = record.floating.map_or(0.5, |v| v + 0.5);
            expected.floating = Some(v);
            FlagValue::Number(v)
        }
    };
    (value, expected)
}

#[test]
fn every_record_resolves_back_to_its_own_slot() -> Result<()> {
    let doc = fixture_document("config.json")?;
    let before = project(&doc);
    assert_eq!(before.len(), 22);

    let mut written = 0;
    for (i, record) in before.iter().enumerate() {
        assert_eq!(resolve(&doc, &record.name), Some(record.slot), "{}", record.name);

        for flag in ALL_FLAGS.into_iter().filter(|f| record.supports(*f)) {
            let (value, expected_record) = changed(record, flag);
            assert_ne!(record.flag(flag), Some(value), "{} {flag}", record.name);

            let mut edited = doc.clone();
            apply(&mut edited, &record.name, flag, value)?;
            let after = project(&edited);

            let mut expected = before.clone();
            expected[i] = expected_record;
            assert_eq!(after, expected, "{} {flag}", record.name);
            assert_eq!(after[i].flag(flag), Some(value), "{} {flag}", record.name);
            written += 1;
        }
    }

    // Toggles take two flags; every other component takes five, plus a fixed value when it is
    // a Float that is not derived.
    let expected_writes: usize = before
        .iter()
        .map(|r| ALL_FLAGS.iter().filter(|f| r.supports(**f)).count())
        .sum();
    assert_eq!(written, expected_writes);
    assert!(before.iter().any(|r| r.supports(FlagKind::FixedValue)));
    assert!(before.iter().any(|r| r.floating.is_some()));
    Ok(())
}

#[test]
fn bulk_operations_preserve_arity_and_are_idempotent() -> Result<()> {
    let doc = fixture_document("config.json")?;
    let shape = arities(&doc);

    let mut ops = BulkOp::BUTTONS.to_vec();
    ops.extend(SendMode::ALL.map(BulkOp::SetSendMode));
    for op in ops {
        let mut once = doc.clone();
        bulk::run(&mut once, op);
        assert_eq!(arities(&once), shape, "{op:?}");

        let mut twice = once.clone();
        bulk::run(&mut twice, op);
        assert_eq!(twice, once, "{op:?}");
    }
    Ok(())
}

#[test]
fn digital_then_analog_equals_clear_all() -> Result<()> {
    let doc = fixture_document("config.json")?;

    let mut partitioned = doc.clone();
    bulk::run(&mut partitioned, BulkOp::Clear(Category::Digital));
    bulk::run(&mut partitioned, BulkOp::Clear(Category::Analog));

    let mut all = doc;
    bulk::run(&mut all, BulkOp::ClearAll);
    assert_eq!(partitioned, all);
    Ok(())
}

#[test]
fn category_clears_follow_action_metadata() -> Result<()> {
    let mut doc = fixture_document("config.json")?;
    bulk::run(&mut doc, BulkOp::SelectAll);
    bulk::run(&mut doc, BulkOp::Clear(Category::Touch));

    let disabled: Vec<String> = project(&doc)
        .into_iter()
        .filter(|r| !r.enabled)
        .map(|r| r.name)
        .collect();
    assert_eq!(
        disabled,
        vec!["LeftATouch", "LeftTouchpadX", "LeftTouchpadY", "LeftTouchpadTouch"]
    );

    bulk::run(&mut doc, BulkOp::SelectAll);
    bulk::run(&mut doc, BulkOp::Clear(Category::Click));
    let disabled: Vec<String> = project(&doc)
        .into_iter()
        .filter(|r| !r.enabled)
        .map(|r| r.name)
        .collect();
    assert_eq!(disabled, vec!["LeftAClick"]);
    Ok(())
}

#[test]
fn derived_components_are_labelled_and_protected() -> Result<()> {
    let mut doc = fixture_document("config.json")?;
    let record = project(&doc)
        .into_iter()
        .find(|r| r.name == "LeftTouchpadY")
        .ok_or("missing LeftTouchpadY")?;
    assert_eq!(record.annotation, Some("derived from paired axis"));

    let err = apply(
        &mut doc,
        "LeftTouchpadY",
        FlagKind::FixedValue,
        FlagValue::Number(0.1),
    )
    .unwrap_err();
    assert_eq!(err, EditError::DerivedComponent("LeftTouchpadY".to_string()));

    let err = apply(
        &mut doc,
        "LeftTouchpadX",
        FlagKind::FixedValue,
        FlagValue::Number(-100.0),
    )
    .unwrap_err();
    assert!(matches!(err, EditError::ReservedSentinel { .. }));
    Ok(())
}

#[test]
fn legacy_boolean_send_mode_upgrades_only_when_needed() -> Result<()> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("config_legacy.json");
    let mut config = LoadedConfig::load_path(&path)?;

    config.handle(thumbparams_editor::EditEvent::Field {
        name: "LeftATouch".to_string(),
        flag: FlagKind::AlwaysSend,
        value: FlagValue::SendMode(SendMode::Always),
    })?;
    let text = String::from_utf8(config.save_bytes())?;
    assert!(text.contains("\"always\": true"));
    assert!(!text.contains("\"always\": 1"));

    config.handle(thumbparams_editor::EditEvent::Field {
        name: "RightStickY".to_string(),
        flag: FlagKind::AlwaysSend,
        value: FlagValue::SendMode(SendMode::WhileActive),
    })?;
    let reloaded = LoadedConfig::from_bytes(config.save_bytes())?;
    let Binding::Vector { flags, .. } = &reloaded.document.primary[2].binding else {
        return Err("expected vector".into());
    };
    let modes: Vec<SendMode> = flags.iter().map(|f| f.send_mode).collect();
    assert_eq!(
        modes,
        vec![SendMode::OnChange, SendMode::WhileActive, SendMode::Always]
    );
    Ok(())
}
