use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use thumbparams_editor::model::SendMode;
use thumbparams_editor::{ConfigValue, EditEvent, FlagKind, FlagValue, LoadedConfig};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn changed_lines(before: &[u8], after: &[u8]) -> Result<Vec<String>> {
    let before = std::str::from_utf8(before)?;
    let after = std::str::from_utf8(after)?;
    assert_eq!(
        before.lines().count(),
        after.lines().count(),
        "expected same number of lines after edit"
    );
    Ok(before
        .lines()
        .zip(after.lines())
        .filter(|(a, b)| a != b)
        .map(|(_, b)| b.to_string())
        .collect())
}

#[test]
fn roundtrip_unmodified_fixtures_bytes_identical() -> Result<()> {
    for name in ["config.json", "config_legacy.json"] {
        let path = fixture(name);
        let input = std::fs::read(&path)?;
        let config = LoadedConfig::load_path(&path)?;
        assert_eq!(config.save_bytes(), input, "{name}");
    }
    Ok(())
}

#[test]
fn regenerating_an_unedited_document_reproduces_it() -> Result<()> {
    for name in ["config.json", "config_legacy.json"] {
        let path = fixture(name);
        let input = std::fs::read(&path)?;
        let config = LoadedConfig::load_path(&path)?;
        assert_eq!(
            String::from_utf8(config.generate_bytes())?,
            String::from_utf8(input)?,
            "{name}"
        );
    }
    Ok(())
}

#[test]
fn hand_edited_json5_is_kept_verbatim_until_edited() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");
    let input = r#"{
    // written by hand
    IP: "127.0.0.1",
    Port: 9000,
    PollingRate: 60,
    StickMoveTolerance: 5,
    actions: [
        { type: "boolean", osc_parameter: "A", enabled: true, },
    ],
}
"#;
    std::fs::write(&path, input)?;

    let config = LoadedConfig::load_path(&path)?;
    assert!(!config.dirty);
    assert!(config.rewrites_layout());
    assert_eq!(config.save_bytes(), input.as_bytes());
    Ok(())
}

#[test]
fn single_flag_edit_changes_one_line() -> Result<()> {
    let path = fixture("config.json");
    let input = std::fs::read(&path)?;
    let mut config = LoadedConfig::load_path(&path)?;

    config.handle(EditEvent::Field {
        name: "LeftStickY".to_string(),
        flag: FlagKind::Enabled,
        value: FlagValue::Bool(false),
    })?;
    assert!(config.dirty);

    let changed = changed_lines(&input, &config.save_bytes())?;
    assert_eq!(changed, vec!["        false,".to_string()]);
    Ok(())
}

#[test]
fn toggle_send_mode_edit_changes_one_line() -> Result<()> {
    let path = fixture("config.json");
    let input = std::fs::read(&path)?;
    let mut config = LoadedConfig::load_path(&path)?;

    config.handle(EditEvent::Field {
        name: "ControllerType".to_string(),
        flag: FlagKind::AlwaysSend,
        value: FlagValue::SendMode(SendMode::WhileActive),
    })?;

    let changed = changed_lines(&input, &config.save_bytes())?;
    assert_eq!(changed, vec!["    \"always\": 2".to_string()]);
    Ok(())
}

#[test]
fn dirty_save_reloads_to_the_same_document() -> Result<()> {
    let mut config = LoadedConfig::load_path(&fixture("config.json"))?;
    config.handle(EditEvent::NumericText {
        name: "LeftTrigger".to_string(),
        flag: FlagKind::FixedValue,
        text: "0.75".to_string(),
    })?;

    let bytes = config.save_bytes();
    ConfigValue::parse(std::str::from_utf8(&bytes)?)?;
    let reloaded = LoadedConfig::from_bytes(bytes)?;
    assert_eq!(reloaded.records(), config.records());
    Ok(())
}
