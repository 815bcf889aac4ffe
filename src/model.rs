//! Typed view of the configuration document.
//!
//! Loading normalizes every flag into one rich representation (a send mode is always a
//! [`SendMode`], a vector action always carries one [`ComponentFlags`] per parameter) while
//! remembering how each value was spelled, so writing the document back only changes the
//! fields that were actually edited.

use crate::error::DocumentError;
use crate::statics;
use crate::value::{ConfigNumber, ConfigValue};
use indexmap::IndexMap;
use std::collections::HashSet;

/// When the runtime transmits a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SendMode {
    #[default]
    OnChange,
    Always,
    WhileActive,
}

impl SendMode {
    pub const ALL: [SendMode; 3] = [SendMode::OnChange, SendMode::Always, SendMode::WhileActive];

    pub fn code(self) -> i64 {
        match self {
            SendMode::OnChange => 0,
            SendMode::Always => 1,
            SendMode::WhileActive => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SendMode::OnChange),
            1 => Some(SendMode::Always),
            2 => Some(SendMode::WhileActive),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SendMode::OnChange => statics::EN_SEND_ON_CHANGE,
            SendMode::Always => statics::EN_SEND_ALWAYS,
            SendMode::WhileActive => statics::EN_SEND_WHILE_ACTIVE,
        }
    }
}

/// How a row is presented and which edits make sense for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayType {
    Integer,
    Boolean,
    Float,
}

impl DisplayType {
    pub fn label(self) -> &'static str {
        match self {
            DisplayType::Integer => statics::EN_TYPE_INTEGER,
            DisplayType::Boolean => statics::EN_TYPE_BOOLEAN,
            DisplayType::Float => statics::EN_TYPE_FLOAT,
        }
    }
}

/// How a flag was spelled in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Encoding {
    #[default]
    Absent,
    Bool,
    Int,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Encodings {
    enabled: Encoding,
    always: Encoding,
    unsigned: Encoding,
    binary: Encoding,
    fixed_value: Encoding,
    floating: Encoding,
}

/// Flags of one parameter: a scalar action, or one position of a vector action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentFlags {
    pub enabled: bool,
    pub send_mode: SendMode,
    pub unsigned: bool,
    pub binary: bool,
    pub fixed_value: Option<f64>,
    /// Hold time in seconds; `-1` on boolean actions selects toggle mode.
    pub floating: Option<f64>,
    encodings: Encodings,
}

impl ComponentFlags {
    pub fn is_derived(&self) -> bool {
        self.fixed_value == Some(statics::DERIVED_SENTINEL)
    }
}

/// Position of a parameter inside its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Scalar,
    Index(usize),
}

impl Component {
    pub fn position(self) -> usize {
        match self {
            Component::Scalar => 0,
            Component::Index(i) => i,
        }
    }
}

/// The parameter names of an action and their flags. Vector arity is fixed at load.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Scalar {
        parameter: String,
        flags: ComponentFlags,
    },
    Vector {
        parameters: Vec<String>,
        flags: Vec<ComponentFlags>,
    },
}

impl Binding {
    pub fn arity(&self) -> usize {
        match self {
            Binding::Scalar { .. } => 1,
            Binding::Vector { parameters, .. } => parameters.len(),
        }
    }

    pub fn parameters(&self) -> &[String] {
        match self {
            Binding::Scalar { parameter, .. } => std::slice::from_ref(parameter),
            Binding::Vector { parameters, .. } => parameters,
        }
    }

    pub fn components(&self) -> &[ComponentFlags] {
        match self {
            Binding::Scalar { flags, .. } => std::slice::from_ref(flags),
            Binding::Vector { flags, .. } => flags,
        }
    }

    /// Every (position, name, flags) triple in identity-list order.
    pub fn iter(&self) -> impl Iterator<Item = (Component, &str, &ComponentFlags)> {
        let vector = matches!(self, Binding::Vector { .. });
        self.parameters()
            .iter()
            .zip(self.components())
            .enumerate()
            .map(move |(i, (name, flags))| {
                let component = if vector {
                    Component::Index(i)
                } else {
                    Component::Scalar
                };
                (component, name.as_str(), flags)
            })
    }

    pub fn position_of(&self, name: &str) -> Option<Component> {
        match self {
            Binding::Scalar { parameter, .. } => (parameter == name).then_some(Component::Scalar),
            Binding::Vector { parameters, .. } => parameters
                .iter()
                .position(|p| p == name)
                .map(Component::Index),
        }
    }

    pub fn component(&self, component: Component) -> Option<&ComponentFlags> {
        match (self, component) {
            (Binding::Scalar { flags, .. }, Component::Scalar) => Some(flags),
            (Binding::Vector { flags, .. }, Component::Index(i)) => flags.get(i),
            _ => None,
        }
    }

    pub fn component_mut(&mut self, component: Component) -> Option<&mut ComponentFlags> {
        match (self, component) {
            (Binding::Scalar { flags, .. }, Component::Scalar) => Some(flags),
            (Binding::Vector { flags, .. }, Component::Index(i)) => flags.get_mut(i),
            _ => None,
        }
    }

    pub fn parameter(&self, component: Component) -> Option<&str> {
        match (self, component) {
            (Binding::Scalar { parameter, .. }, Component::Scalar) => Some(parameter),
            (Binding::Vector { parameters, .. }, Component::Index(i)) => {
                parameters.get(i).map(String::as_str)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Boolean,
    Float,
    Vector,
    /// A type this editor does not interpret (e.g. `skeleton`); its shape follows `osc_parameter`.
    Other,
}

impl ActionKind {
    fn from_type(type_name: &str) -> Self {
        match type_name {
            statics::CFG_TYPE_BOOLEAN => ActionKind::Boolean,
            statics::CFG_TYPE_VECTOR1 | statics::CFG_TYPE_FLOAT => ActionKind::Float,
            statics::CFG_TYPE_VECTOR2 | statics::CFG_TYPE_VECTOR3 => ActionKind::Vector,
            _ => ActionKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    Touch,
    Click,
    Other,
}

impl ActionCategory {
    fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case(statics::CFG_CATEGORY_TOUCH) {
            ActionCategory::Touch
        } else if tag.eq_ignore_ascii_case(statics::CFG_CATEGORY_CLICK) {
            ActionCategory::Click
        } else {
            ActionCategory::Other
        }
    }

    fn infer<'a>(mut names: impl Iterator<Item = &'a str>) -> Self {
        names
            .find_map(|name| {
                let lower = name.to_ascii_lowercase();
                if lower.contains(statics::CFG_CATEGORY_TOUCH) {
                    Some(ActionCategory::Touch)
                } else if lower.contains(statics::CFG_CATEGORY_CLICK) {
                    Some(ActionCategory::Click)
                } else {
                    None
                }
            })
            .unwrap_or(ActionCategory::Other)
    }
}

/// One controllable unit of an action collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// SteamVR action path (`name` in the file), when present.
    pub path: Option<String>,
    pub type_name: String,
    pub kind: ActionKind,
    pub category: ActionCategory,
    pub binding: Binding,
}

impl Action {
    pub fn display_type(&self, component: Component) -> DisplayType {
        match (&self.kind, component) {
            (ActionKind::Boolean, _) => DisplayType::Boolean,
            (_, Component::Scalar) => DisplayType::Float,
            // Third position of a vector is the digital "moved/clicked" channel.
            (_, Component::Index(i)) if i >= 2 => DisplayType::Boolean,
            (_, Component::Index(_)) => DisplayType::Float,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Primary,
    Extended,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Primary, Collection::Extended];

    pub fn key(self) -> &'static str {
        match self {
            Collection::Primary => statics::CFG_ACTIONS,
            Collection::Extended => statics::CFG_XINPUT_ACTIONS,
        }
    }
}

/// Named settings outside the action collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleId {
    ControllerType,
    LeftThumb,
    RightThumb,
    LeftAbButtons,
    RightAbButtons,
}

impl ToggleId {
    /// On-screen order.
    pub const ALL: [ToggleId; 5] = [
        ToggleId::ControllerType,
        ToggleId::LeftThumb,
        ToggleId::RightThumb,
        ToggleId::LeftAbButtons,
        ToggleId::RightAbButtons,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToggleId::ControllerType => statics::CFG_CONTROLLER_TYPE,
            ToggleId::LeftThumb => statics::CFG_LEFT_THUMB,
            ToggleId::RightThumb => statics::CFG_RIGHT_THUMB,
            ToggleId::LeftAbButtons => statics::CFG_LEFT_AB_BUTTONS,
            ToggleId::RightAbButtons => statics::CFG_RIGHT_AB_BUTTONS,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn display_type(self) -> DisplayType {
        match self {
            ToggleId::ControllerType | ToggleId::LeftThumb | ToggleId::RightThumb => {
                DisplayType::Integer
            }
            ToggleId::LeftAbButtons | ToggleId::RightAbButtons => DisplayType::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToggleForm {
    /// Legacy schema: the toggle is a plain boolean meaning `enabled`.
    Bare,
    Object { enabled: Encoding, always: Encoding },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingletonToggle {
    pub id: ToggleId,
    pub enabled: bool,
    pub send_mode: SendMode,
    form: ToggleForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultBinding {
    pub controller_type: String,
    pub binding_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionField {
    Host,
    Port,
    ServerPort,
    HttpPort,
    PollingRate,
    StickTolerance,
    XInputPollingRate,
    BinaryBitWidth,
}

impl ConnectionField {
    pub const ALL: [ConnectionField; 8] = [
        ConnectionField::Host,
        ConnectionField::Port,
        ConnectionField::ServerPort,
        ConnectionField::HttpPort,
        ConnectionField::PollingRate,
        ConnectionField::StickTolerance,
        ConnectionField::XInputPollingRate,
        ConnectionField::BinaryBitWidth,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ConnectionField::Host => statics::CFG_IP,
            ConnectionField::Port => statics::CFG_PORT,
            ConnectionField::ServerPort => statics::CFG_SERVER_PORT,
            ConnectionField::HttpPort => statics::CFG_HTTP_PORT,
            ConnectionField::PollingRate => statics::CFG_POLLING_RATE,
            ConnectionField::StickTolerance => statics::CFG_STICK_TOLERANCE,
            ConnectionField::XInputPollingRate => statics::CFG_XINPUT_POLLING_RATE,
            ConnectionField::BinaryBitWidth => statics::CFG_BINARY_BIT_WIDTH,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionField::Host => statics::EN_LABEL_HOST,
            ConnectionField::Port => statics::EN_LABEL_PORT,
            ConnectionField::ServerPort => statics::EN_LABEL_SERVER_PORT,
            ConnectionField::HttpPort => statics::EN_LABEL_HTTP_PORT,
            ConnectionField::PollingRate => statics::EN_LABEL_POLLING_RATE,
            ConnectionField::StickTolerance => statics::EN_LABEL_STICK_TOLERANCE,
            ConnectionField::XInputPollingRate => statics::EN_LABEL_XINPUT_POLLING_RATE,
            ConnectionField::BinaryBitWidth => statics::EN_LABEL_BINARY_BIT_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub host: String,
    pub port: i64,
    pub server_port: Option<i64>,
    pub http_port: Option<i64>,
    pub polling_rate: i64,
    pub stick_tolerance: i64,
    pub xinput_polling_rate: Option<i64>,
    pub binary_bit_width: Option<i64>,
}

impl Connection {
    /// Current value as editable text; empty for optional settings the file does not carry.
    pub fn text(&self, field: ConnectionField) -> String {
        match field {
            ConnectionField::Host => self.host.clone(),
            _ => self
                .integer(field)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn integer(&self, field: ConnectionField) -> Option<i64> {
        match field {
            ConnectionField::Host => None,
            ConnectionField::Port => Some(self.port),
            ConnectionField::ServerPort => self.server_port,
            ConnectionField::HttpPort => self.http_port,
            ConnectionField::PollingRate => Some(self.polling_rate),
            ConnectionField::StickTolerance => Some(self.stick_tolerance),
            ConnectionField::XInputPollingRate => self.xinput_polling_rate,
            ConnectionField::BinaryBitWidth => self.binary_bit_width,
        }
    }

    pub fn set_integer(&mut self, field: ConnectionField, value: i64) {
        match field {
            ConnectionField::Host => {}
            ConnectionField::Port => self.port = value,
            ConnectionField::ServerPort => self.server_port = Some(value),
            ConnectionField::HttpPort => self.http_port = Some(value),
            ConnectionField::PollingRate => self.polling_rate = value,
            ConnectionField::StickTolerance => self.stick_tolerance = value,
            ConnectionField::XInputPollingRate => self.xinput_polling_rate = Some(value),
            ConnectionField::BinaryBitWidth => self.binary_bit_width = Some(value),
        }
    }
}

/// The whole configuration: the single source of truth of an editor session.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub connection: Connection,
    pub default_bindings: Vec<DefaultBinding>,
    /// Toggles present in the file, in [`ToggleId::ALL`] order.
    pub toggles: Vec<SingletonToggle>,
    pub primary: Vec<Action>,
    /// `None` when the file has no extended-input collection.
    pub extended: Option<Vec<Action>>,
    raw: ConfigValue,
}

impl Document {
    pub fn load(raw: ConfigValue) -> Result<Self, DocumentError> {
        let Some(root) = raw.as_object() else {
            return Err(DocumentError::RootNotObject(raw.type_name()));
        };

        let connection = parse_connection(root)?;

        let default_bindings = match root.get(statics::CFG_DEFAULT_BINDINGS) {
            Some(value) => parse_default_bindings(value)?,
            None => Vec::new(),
        };

        let mut toggles = Vec::new();
        for id in ToggleId::ALL {
            if let Some(value) = root.get(id.name()) {
                toggles.push(parse_toggle(id, value)?);
            }
        }

        let primary = match root.get(statics::CFG_ACTIONS) {
            Some(value) => parse_collection(Collection::Primary, value)?,
            None => return Err(DocumentError::MissingField(statics::CFG_ACTIONS.to_string())),
        };
        let extended = match root.get(statics::CFG_XINPUT_ACTIONS) {
            None | Some(ConfigValue::Null) => None,
            Some(value) => Some(parse_collection(Collection::Extended, value)?),
        };

        let mut seen = HashSet::new();
        for action in primary.iter().chain(extended.iter().flatten()) {
            for name in action.binding.parameters() {
                if ToggleId::from_name(name).is_some() {
                    return Err(DocumentError::ReservedName(name.clone()));
                }
                if !seen.insert(name.as_str()) {
                    return Err(DocumentError::DuplicateName(name.clone()));
                }
            }
        }

        Ok(Self {
            connection,
            default_bindings,
            toggles,
            primary,
            extended,
            raw,
        })
    }

    /// The document as it should be persisted: the loaded tree with every modelled field
    /// rewritten from the current state. Unmodelled fields stay as loaded.
    pub fn serialize(&self) -> ConfigValue {
        let mut out = self.raw.clone();
        if let Some(root) = out.as_object_mut() {
            write_connection(root, &self.connection);
            for toggle in &self.toggles {
                write_toggle(root, toggle);
            }
            for collection in Collection::ALL {
                let Some(entries) = root
                    .get_mut(collection.key())
                    .and_then(ConfigValue::as_array_mut)
                else {
                    continue;
                };
                for (action, entry) in self.collection(collection).iter().zip(entries.iter_mut()) {
                    if let Some(map) = entry.as_object_mut() {
                        write_binding(map, &action.binding);
                    }
                }
            }
        }
        out
    }

    pub fn collection(&self, collection: Collection) -> &[Action] {
        match collection {
            Collection::Primary => &self.primary,
            Collection::Extended => self.extended.as_deref().unwrap_or(&[]),
        }
    }

    pub fn collection_mut(&mut self, collection: Collection) -> &mut [Action] {
        match collection {
            Collection::Primary => &mut self.primary,
            Collection::Extended => self.extended.as_deref_mut().unwrap_or(&mut []),
        }
    }

    pub fn toggle(&self, id: ToggleId) -> Option<&SingletonToggle> {
        self.toggles.iter().find(|t| t.id == id)
    }

    pub fn toggle_mut(&mut self, id: ToggleId) -> Option<&mut SingletonToggle> {
        self.toggles.iter_mut().find(|t| t.id == id)
    }
}

type Map = IndexMap<String, ConfigValue>;

fn required<'a>(map: &'a Map, key: &str, path: &str) -> Result<&'a ConfigValue, DocumentError> {
    map.get(key)
        .ok_or_else(|| DocumentError::MissingField(join_path(path, key)))
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn wrong_type(field: String, expected: &'static str, value: &ConfigValue) -> DocumentError {
    DocumentError::WrongType {
        field,
        expected,
        found: value.type_name(),
    }
}

fn decode_integer(value: &ConfigValue, field: &str) -> Result<i64, DocumentError> {
    value
        .as_number()
        .and_then(ConfigNumber::as_i64)
        .ok_or_else(|| wrong_type(field.to_string(), "an integer", value))
}

fn decode_string(value: &ConfigValue, field: &str) -> Result<String, DocumentError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(field.to_string(), "a string", value))
}

fn decode_bool(value: &ConfigValue, field: &str) -> Result<(bool, Encoding), DocumentError> {
    match value {
        ConfigValue::Bool(b) => Ok((*b, Encoding::Bool)),
        ConfigValue::Number(n) => match n.as_i64() {
            Some(0) => Ok((false, Encoding::Int)),
            Some(1) => Ok((true, Encoding::Int)),
            _ => Err(wrong_type(field.to_string(), "a boolean", value)),
        },
        _ => Err(wrong_type(field.to_string(), "a boolean", value)),
    }
}

fn decode_send_mode(
    value: &ConfigValue,
    field: &str,
) -> Result<(SendMode, Encoding), DocumentError> {
    const EXPECTED: &str = "a boolean or a send-mode code 0-2";
    match value {
        ConfigValue::Bool(true) => Ok((SendMode::Always, Encoding::Bool)),
        ConfigValue::Bool(false) => Ok((SendMode::OnChange, Encoding::Bool)),
        ConfigValue::Number(n) => n
            .as_i64()
            .and_then(SendMode::from_code)
            .map(|mode| (mode, Encoding::Int))
            .ok_or_else(|| wrong_type(field.to_string(), EXPECTED, value)),
        _ => Err(wrong_type(field.to_string(), EXPECTED, value)),
    }
}

fn decode_number(
    value: &ConfigValue,
    field: &str,
) -> Result<(Option<f64>, Encoding), DocumentError> {
    match value {
        ConfigValue::Null => Ok((None, Encoding::Absent)),
        ConfigValue::Number(n) if n.is_integer() => Ok((Some(n.as_f64()), Encoding::Int)),
        ConfigValue::Number(n) => Ok((Some(n.as_f64()), Encoding::Float)),
        _ => Err(wrong_type(field.to_string(), "a number", value)),
    }
}

fn parse_connection(root: &Map) -> Result<Connection, DocumentError> {
    let optional = |key: &str| -> Result<Option<i64>, DocumentError> {
        root.get(key).map(|v| decode_integer(v, key)).transpose()
    };

    Ok(Connection {
        host: decode_string(required(root, statics::CFG_IP, "")?, statics::CFG_IP)?,
        port: decode_integer(required(root, statics::CFG_PORT, "")?, statics::CFG_PORT)?,
        server_port: optional(statics::CFG_SERVER_PORT)?,
        http_port: optional(statics::CFG_HTTP_PORT)?,
        polling_rate: decode_integer(
            required(root, statics::CFG_POLLING_RATE, "")?,
            statics::CFG_POLLING_RATE,
        )?,
        stick_tolerance: decode_integer(
            required(root, statics::CFG_STICK_TOLERANCE, "")?,
            statics::CFG_STICK_TOLERANCE,
        )?,
        xinput_polling_rate: optional(statics::CFG_XINPUT_POLLING_RATE)?,
        binary_bit_width: optional(statics::CFG_BINARY_BIT_WIDTH)?,
    })
}

fn parse_default_bindings(value: &ConfigValue) -> Result<Vec<DefaultBinding>, DocumentError> {
    let Some(items) = value.as_array() else {
        return Err(wrong_type(
            statics::CFG_DEFAULT_BINDINGS.to_string(),
            "an array",
            value,
        ));
    };

    // Bindings are opaque to the editor; entries it cannot show are skipped, not rejected.
    Ok(items
        .iter()
        .filter_map(|item| {
            let controller_type = item.get(statics::CFG_BINDING_CONTROLLER_TYPE)?.as_str()?;
            let binding_url = item.get(statics::CFG_BINDING_URL)?.as_str()?;
            Some(DefaultBinding {
                controller_type: controller_type.to_string(),
                binding_url: binding_url.to_string(),
            })
        })
        .collect())
}

fn parse_toggle(id: ToggleId, value: &ConfigValue) -> Result<SingletonToggle, DocumentError> {
    match value {
        ConfigValue::Bool(enabled) => Ok(SingletonToggle {
            id,
            enabled: *enabled,
            send_mode: SendMode::OnChange,
            form: ToggleForm::Bare,
        }),
        ConfigValue::Object(map) => {
            let path = id.name();
            let (enabled, enabled_enc) = decode_bool(
                required(map, statics::CFG_FIELD_ENABLED, path)?,
                &join_path(path, statics::CFG_FIELD_ENABLED),
            )?;
            let (send_mode, always_enc) = match map.get(statics::CFG_FIELD_ALWAYS) {
                Some(v) => decode_send_mode(v, &join_path(path, statics::CFG_FIELD_ALWAYS))?,
                None => (SendMode::OnChange, Encoding::Absent),
            };
            Ok(SingletonToggle {
                id,
                enabled,
                send_mode,
                form: ToggleForm::Object {
                    enabled: enabled_enc,
                    always: always_enc,
                },
            })
        }
        _ => Err(wrong_type(
            id.name().to_string(),
            "a boolean or an object",
            value,
        )),
    }
}

fn parse_collection(
    collection: Collection,
    value: &ConfigValue,
) -> Result<Vec<Action>, DocumentError> {
    let Some(items) = value.as_array() else {
        return Err(wrong_type(collection.key().to_string(), "an array", value));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_action(&format!("{}[{i}]", collection.key()), item))
        .collect()
}

fn parse_action(path: &str, value: &ConfigValue) -> Result<Action, DocumentError> {
    let Some(map) = value.as_object() else {
        return Err(wrong_type(path.to_string(), "an object", value));
    };

    let type_name = decode_string(
        required(map, statics::CFG_FIELD_TYPE, path)?,
        &join_path(path, statics::CFG_FIELD_TYPE),
    )?;
    let kind = ActionKind::from_type(&type_name);
    let action_path = match map.get(statics::CFG_FIELD_NAME) {
        Some(v) => Some(decode_string(v, &join_path(path, statics::CFG_FIELD_NAME))?),
        None => None,
    };

    let parameter_field = join_path(path, statics::CFG_FIELD_OSC_PARAMETER);
    let binding = match required(map, statics::CFG_FIELD_OSC_PARAMETER, path)? {
        ConfigValue::String(parameter) => {
            if kind == ActionKind::Vector {
                return Err(DocumentError::UnsupportedArity {
                    action: path.to_string(),
                    found: 1,
                });
            }
            let mut flags = parse_components(map, path, None)?;
            Binding::Scalar {
                parameter: parameter.clone(),
                flags: flags.remove(0),
            }
        }
        ConfigValue::Array(items) => {
            if matches!(kind, ActionKind::Boolean | ActionKind::Float) {
                return Err(DocumentError::ShapeMismatch {
                    action: path.to_string(),
                    kind: type_name,
                });
            }
            if !(2..=3).contains(&items.len()) {
                return Err(DocumentError::UnsupportedArity {
                    action: path.to_string(),
                    found: items.len(),
                });
            }
            let parameters = items
                .iter()
                .map(|item| decode_string(item, &parameter_field))
                .collect::<Result<Vec<_>, _>>()?;
            let flags = parse_components(map, path, Some(parameters.len()))?;
            Binding::Vector { parameters, flags }
        }
        other => return Err(wrong_type(parameter_field, "a string or an array", other)),
    };

    let category = match map.get(statics::CFG_FIELD_CATEGORY).and_then(ConfigValue::as_str) {
        Some(tag) => ActionCategory::from_tag(tag),
        None => ActionCategory::infer(
            action_path
                .as_deref()
                .into_iter()
                .chain(binding.parameters().iter().map(String::as_str)),
        ),
    };

    Ok(Action {
        path: action_path,
        type_name,
        kind,
        category,
        binding,
    })
}

/// Items of a per-component field: one for scalar actions, `arity` for vector actions.
fn field_items<'a>(
    map: &'a Map,
    key: &'static str,
    path: &str,
    arity: Option<usize>,
) -> Result<Option<Vec<&'a ConfigValue>>, DocumentError> {
    let Some(value) = map.get(key) else {
        return Ok(None);
    };
    match (arity, value) {
        (None, ConfigValue::Array(_)) => Err(wrong_type(
            join_path(path, key),
            "a single value",
            value,
        )),
        (None, v) => Ok(Some(vec![v])),
        (Some(n), ConfigValue::Array(items)) if items.len() == n => {
            Ok(Some(items.iter().collect()))
        }
        (Some(n), ConfigValue::Array(items)) => Err(DocumentError::ArityMismatch {
            action: path.to_string(),
            field: key,
            expected: n,
            found: items.len(),
        }),
        (Some(_), v) => Err(wrong_type(join_path(path, key), "an array", v)),
    }
}

fn parse_components(
    map: &Map,
    path: &str,
    arity: Option<usize>,
) -> Result<Vec<ComponentFlags>, DocumentError> {
    let mut components = vec![ComponentFlags::default(); arity.unwrap_or(1)];

    let enabled = field_items(map, statics::CFG_FIELD_ENABLED, path, arity)?.ok_or_else(|| {
        DocumentError::MissingField(join_path(path, statics::CFG_FIELD_ENABLED))
    })?;
    let field = join_path(path, statics::CFG_FIELD_ENABLED);
    for (c, v) in components.iter_mut().zip(enabled) {
        (c.enabled, c.encodings.enabled) = decode_bool(v, &field)?;
    }

    if let Some(items) = field_items(map, statics::CFG_FIELD_ALWAYS, path, arity)? {
        let field = join_path(path, statics::CFG_FIELD_ALWAYS);
        for (c, v) in components.iter_mut().zip(items) {
            (c.send_mode, c.encodings.always) = decode_send_mode(v, &field)?;
        }
    }

    if let Some(items) = field_items(map, statics::CFG_FIELD_UNSIGNED, path, arity)? {
        let field = join_path(path, statics::CFG_FIELD_UNSIGNED);
        for (c, v) in components.iter_mut().zip(items) {
            (c.unsigned, c.encodings.unsigned) = decode_bool(v, &field)?;
        }
    }

    if let Some(items) = field_items(map, statics::CFG_FIELD_BINARY, path, arity)? {
        let field = join_path(path, statics::CFG_FIELD_BINARY);
        for (c, v) in components.iter_mut().zip(items) {
            (c.binary, c.encodings.binary) = decode_bool(v, &field)?;
        }
    }

    if let Some(items) = field_items(map, statics::CFG_FIELD_FIXED_VALUE, path, arity)? {
        let field = join_path(path, statics::CFG_FIELD_FIXED_VALUE);
        for (c, v) in components.iter_mut().zip(items) {
            (c.fixed_value, c.encodings.fixed_value) = decode_number(v, &field)?;
        }
    }

    if let Some(items) = field_items(map, statics::CFG_FIELD_FLOATING, path, arity)? {
        let field = join_path(path, statics::CFG_FIELD_FLOATING);
        for (c, v) in components.iter_mut().zip(items) {
            (c.floating, c.encodings.floating) = decode_number(v, &field)?;
        }
    }

    Ok(components)
}

fn encode_bool(value: bool, encoding: Encoding) -> ConfigValue {
    match encoding {
        Encoding::Int => ConfigValue::int(i64::from(value)),
        _ => ConfigValue::Bool(value),
    }
}

fn encode_send_mode(mode: SendMode, encoding: Encoding, as_codes: bool) -> ConfigValue {
    if encoding == Encoding::Bool && !as_codes {
        ConfigValue::Bool(mode == SendMode::Always)
    } else {
        ConfigValue::int(mode.code())
    }
}

fn encode_number(value: Option<f64>, encoding: Encoding) -> ConfigValue {
    match value {
        None => ConfigValue::Null,
        Some(v) if encoding == Encoding::Int && v.is_finite() && v.fract() == 0.0 => {
            ConfigValue::int(v as i64)
        }
        Some(v) => ConfigValue::float(v),
    }
}

/// Writes one per-component field, keeping scalar/array shape. Fields that were absent and
/// still hold their default on every component are left out.
fn write_field(
    map: &mut Map,
    key: &str,
    components: &[ComponentFlags],
    vector: bool,
    present: impl Fn(&ComponentFlags) -> bool,
    encode: impl Fn(&ComponentFlags) -> ConfigValue,
) {
    if !components.iter().any(present) {
        return;
    }
    let mut values: Vec<ConfigValue> = components.iter().map(encode).collect();
    let value = if vector {
        ConfigValue::Array(values)
    } else {
        values.remove(0)
    };
    map.insert(key.to_string(), value);
}

fn write_binding(map: &mut Map, binding: &Binding) {
    let vector = matches!(binding, Binding::Vector { .. });
    let components = binding.components();

    write_field(
        map,
        statics::CFG_FIELD_ENABLED,
        components,
        vector,
        |_| true,
        |c| encode_bool(c.enabled, c.encodings.enabled),
    );

    // A legacy boolean field cannot express WhileActive: switch the whole field to codes.
    let as_codes = components
        .iter()
        .any(|c| c.encodings.always == Encoding::Bool && c.send_mode == SendMode::WhileActive);
    write_field(
        map,
        statics::CFG_FIELD_ALWAYS,
        components,
        vector,
        |c| c.encodings.always != Encoding::Absent || c.send_mode != SendMode::OnChange,
        |c| encode_send_mode(c.send_mode, c.encodings.always, as_codes),
    );

    write_field(
        map,
        statics::CFG_FIELD_UNSIGNED,
        components,
        vector,
        |c| c.encodings.unsigned != Encoding::Absent || c.unsigned,
        |c| encode_bool(c.unsigned, c.encodings.unsigned),
    );

    write_field(
        map,
        statics::CFG_FIELD_BINARY,
        components,
        vector,
        |c| c.encodings.binary != Encoding::Absent || c.binary,
        |c| encode_bool(c.binary, c.encodings.binary),
    );

    write_field(
        map,
        statics::CFG_FIELD_FIXED_VALUE,
        components,
        vector,
        |c| c.encodings.fixed_value != Encoding::Absent || c.fixed_value.is_some(),
        |c| encode_number(c.fixed_value, c.encodings.fixed_value),
    );

    write_field(
        map,
        statics::CFG_FIELD_FLOATING,
        components,
        vector,
        |c| c.encodings.floating != Encoding::Absent || c.floating.is_some(),
        |c| encode_number(c.floating, c.encodings.floating),
    );
}

fn write_toggle(root: &mut Map, toggle: &SingletonToggle) {
    let key = toggle.id.name();
    match toggle.form {
        ToggleForm::Bare if toggle.send_mode == SendMode::OnChange => {
            root.insert(key.to_string(), ConfigValue::Bool(toggle.enabled));
        }
        ToggleForm::Bare => {
            // A bare boolean has nowhere to keep a send mode; promote it to the object form.
            let mut map = Map::new();
            map.insert(
                statics::CFG_FIELD_ENABLED.to_string(),
                ConfigValue::Bool(toggle.enabled),
            );
            map.insert(
                statics::CFG_FIELD_ALWAYS.to_string(),
                ConfigValue::int(toggle.send_mode.code()),
            );
            root.insert(key.to_string(), ConfigValue::Object(map));
        }
        ToggleForm::Object { enabled, always } => {
            let Some(map) = root.get_mut(key).and_then(ConfigValue::as_object_mut) else {
                return;
            };
            map.insert(
                statics::CFG_FIELD_ENABLED.to_string(),
                encode_bool(toggle.enabled, enabled),
            );
            if always != Encoding::Absent || toggle.send_mode != SendMode::OnChange {
                let as_codes = toggle.send_mode == SendMode::WhileActive;
                map.insert(
                    statics::CFG_FIELD_ALWAYS.to_string(),
                    encode_send_mode(toggle.send_mode, always, as_codes),
                );
            }
        }
    }
}

fn write_connection(root: &mut Map, connection: &Connection) {
    root.insert(
        statics::CFG_IP.to_string(),
        ConfigValue::String(connection.host.clone()),
    );
    for field in ConnectionField::ALL {
        if let Some(v) = connection.integer(field) {
            root.insert(field.key().to_string(), ConfigValue::int(v));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ConfigValue;

    fn base(actions: &str) -> String {
        format!(
            r#"{{
                "IP": "127.0.0.1",
                "Port": 9000,
                "PollingRate": 60,
                "StickMoveTolerance": 5,
                "actions": {actions}
            }}"#
        )
    }

    fn load(text: &str) -> Result<Document, DocumentError> {
        Document::load(ConfigValue::parse(text).unwrap())
    }

    #[test]
    fn legacy_boolean_send_mode_is_normalized() {
        let doc = load(&base(
            r#"[{ "type": "vector2", "osc_parameter": ["X", "Y"],
                  "enabled": [true, false], "always": [true, false] }]"#,
        ))
        .unwrap();
        let flags = doc.primary[0].binding.components();
        assert_eq!(flags[0].send_mode, SendMode::Always);
        assert_eq!(flags[1].send_mode, SendMode::OnChange);
    }

    #[test]
    fn integer_send_mode_codes_are_accepted() {
        let doc = load(&base(
            r#"[{ "type": "boolean", "osc_parameter": "A", "enabled": 1, "always": 2 }]"#,
        ))
        .unwrap();
        let Binding::Scalar { flags, .. } = &doc.primary[0].binding else {
            panic!("expected scalar binding");
        };
        assert!(flags.enabled);
        assert_eq!(flags.send_mode, SendMode::WhileActive);
    }

    #[test]
    fn vector_flag_length_must_match_parameters() {
        let err = load(&base(
            r#"[{ "type": "vector2", "osc_parameter": ["X", "Y", "Moved"],
                  "enabled": [true, true] }]"#,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            DocumentError::ArityMismatch {
                action: "actions[0]".to_string(),
                field: statics::CFG_FIELD_ENABLED,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn scalar_action_rejects_list_flags() {
        let err = load(&base(
            r#"[{ "type": "boolean", "osc_parameter": "A", "enabled": [true] }]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, DocumentError::WrongType { .. }));
    }

    #[test]
    fn vector_arity_is_limited_to_two_or_three() {
        let err = load(&base(
            r#"[{ "type": "vector2", "osc_parameter": ["X"], "enabled": [true] }]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedArity { found: 1, .. }));
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let err = load(
            r#"{ "IP": "127.0.0.1", "Port": 9000, "StickMoveTolerance": 5, "actions": [] }"#,
        )
        .unwrap_err();
        assert_eq!(err, DocumentError::MissingField("PollingRate".to_string()));

        let err = load(
            r#"{ "IP": "127.0.0.1", "Port": 9000, "PollingRate": 60, "StickMoveTolerance": 5 }"#,
        )
        .unwrap_err();
        assert_eq!(err, DocumentError::MissingField("actions".to_string()));

        let err = load(&base(r#"[{ "type": "boolean", "osc_parameter": "A" }]"#)).unwrap_err();
        assert_eq!(err, DocumentError::MissingField("actions[0].enabled".to_string()));
    }

    #[test]
    fn toggle_names_are_reserved() {
        let err = load(&base(
            r#"[{ "type": "boolean", "osc_parameter": "LeftThumb", "enabled": true }]"#,
        ))
        .unwrap_err();
        assert_eq!(err, DocumentError::ReservedName("LeftThumb".to_string()));
    }

    #[test]
    fn names_shared_across_collections_are_rejected() {
        let text = r#"{
            "IP": "127.0.0.1", "Port": 9000, "PollingRate": 60, "StickMoveTolerance": 5,
            "actions": [{ "type": "boolean", "osc_parameter": "A", "enabled": true }],
            "xinput_actions": [{ "type": "boolean", "osc_parameter": "A", "enabled": false }]
        }"#;
        assert_eq!(
            load(text).unwrap_err(),
            DocumentError::DuplicateName("A".to_string())
        );

        let err = load(&base(
            r#"[{ "type": "vector2", "osc_parameter": ["S", "S"], "enabled": [true, true] }]"#,
        ))
        .unwrap_err();
        assert_eq!(err, DocumentError::DuplicateName("S".to_string()));
    }

    #[test]
    fn toggles_accept_bare_and_object_forms() {
        let text = r#"{
            "IP": "127.0.0.1", "Port": 9000, "PollingRate": 60, "StickMoveTolerance": 5,
            "ControllerType": true,
            "LeftThumb": { "enabled": false, "always": 1, "last_value": 0 },
            "actions": []
        }"#;
        let doc = load(text).unwrap();
        assert_eq!(doc.toggles.len(), 2);
        assert!(doc.toggle(ToggleId::ControllerType).unwrap().enabled);
        let left = doc.toggle(ToggleId::LeftThumb).unwrap();
        assert!(!left.enabled);
        assert_eq!(left.send_mode, SendMode::Always);
        assert!(doc.toggle(ToggleId::RightThumb).is_none());
    }

    #[test]
    fn category_comes_from_tag_or_names() {
        let doc = load(&base(
            r#"[
                { "name": "/actions/thumbparams/in/LeftATouch", "type": "boolean",
                  "osc_parameter": "LeftA", "enabled": true },
                { "type": "boolean", "osc_parameter": "LeftTriggerClick", "enabled": true },
                { "type": "boolean", "osc_parameter": "Grip", "category": "touch",
                  "enabled": true },
                { "type": "vector1", "osc_parameter": "Trigger", "enabled": true }
            ]"#,
        ))
        .unwrap();
        let categories: Vec<_> = doc.primary.iter().map(|a| a.category).collect();
        assert_eq!(
            categories,
            vec![
                ActionCategory::Touch,
                ActionCategory::Click,
                ActionCategory::Touch,
                ActionCategory::Other,
            ]
        );
    }

    #[test]
    fn serialize_promotes_legacy_send_mode_only_when_needed() {
        let mut doc = load(&base(
            r#"[{ "type": "vector2", "osc_parameter": ["X", "Y"],
                  "enabled": [true, true], "always": [true, false] }]"#,
        ))
        .unwrap();

        let untouched = doc.serialize();
        assert_eq!(
            untouched.get("actions").unwrap().as_array().unwrap()[0].get("always"),
            Some(&ConfigValue::Array(vec![
                ConfigValue::Bool(true),
                ConfigValue::Bool(false)
            ]))
        );

        if let Binding::Vector { flags, .. } = &mut doc.primary[0].binding {
            flags[1].send_mode = SendMode::WhileActive;
        }
        let promoted = doc.serialize();
        assert_eq!(
            promoted.get("actions").unwrap().as_array().unwrap()[0].get("always"),
            Some(&ConfigValue::Array(vec![ConfigValue::int(1), ConfigValue::int(2)]))
        );
    }

    #[test]
    fn serialize_leaves_absent_default_fields_out() {
        let mut doc = load(&base(
            r#"[{ "type": "boolean", "osc_parameter": "A", "enabled": false }]"#,
        ))
        .unwrap();
        let out = doc.serialize();
        let entry = &out.get("actions").unwrap().as_array().unwrap()[0];
        assert!(entry.get("unsigned").is_none());
        assert!(entry.get("always").is_none());

        if let Binding::Scalar { flags, .. } = &mut doc.primary[0].binding {
            flags.unsigned = true;
        }
        let out = doc.serialize();
        let entry = &out.get("actions").unwrap().as_array().unwrap()[0];
        assert_eq!(entry.get("unsigned"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn bare_toggle_is_promoted_when_given_a_send_mode() {
        let text = r#"{
            "IP": "127.0.0.1", "Port": 9000, "PollingRate": 60, "StickMoveTolerance": 5,
            "LeftThumb": true,
            "actions": []
        }"#;
        let mut doc = load(text).unwrap();
        assert_eq!(doc.serialize().get("LeftThumb"), Some(&ConfigValue::Bool(true)));

        doc.toggle_mut(ToggleId::LeftThumb).unwrap().send_mode = SendMode::Always;
        let out = doc.serialize();
        let toggle = out.get("LeftThumb").unwrap();
        assert_eq!(toggle.get("enabled"), Some(&ConfigValue::Bool(true)));
        assert_eq!(toggle.get("always"), Some(&ConfigValue::int(1)));
    }

    #[test]
    fn integer_numbers_stay_integers_when_integral() {
        let mut doc = load(&base(
            r#"[{ "type": "vector1", "osc_parameter": "T", "enabled": true, "fixed_value": 3 }]"#,
        ))
        .unwrap();
        let entry = |doc: &Document| {
            doc.serialize().get("actions").unwrap().as_array().unwrap()[0]
                .get("fixed_value")
                .cloned()
        };
        assert_eq!(entry(&doc), Some(ConfigValue::int(3)));

        if let Binding::Scalar { flags, .. } = &mut doc.primary[0].binding {
            flags.fixed_value = Some(0.5);
        }
        assert_eq!(entry(&doc), Some(ConfigValue::float(0.5)));
    }
}
