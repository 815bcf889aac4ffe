// Central place for UI strings, document keys and other non-localized constants.
// Keep these out of gui.rs and model.rs to reduce duplication and make tweaks safer.

/// Reserved `fixed_value`: the component is computed live from its paired axis.
pub const DERIVED_SENTINEL: f64 = -100.0;

// Text layout defaults (used when a document carries no hint of its own).
pub const NL_LF: &str = "\n";
pub const NL_CRLF: &str = "\r\n";
pub const DEFAULT_INDENT: &str = "  ";

// File the runtime reads, next to the executable.
pub const CONFIG_FILE_NAME: &str = "config.json";

// Top-level connection settings (CFG_ prefix).
pub const CFG_IP: &str = "IP";
pub const CFG_PORT: &str = "Port";
pub const CFG_SERVER_PORT: &str = "Server_Port";
pub const CFG_HTTP_PORT: &str = "HTTP_Port";
pub const CFG_POLLING_RATE: &str = "PollingRate";
pub const CFG_STICK_TOLERANCE: &str = "StickMoveTolerance";
pub const CFG_XINPUT_POLLING_RATE: &str = "XInputPollingRate";
pub const CFG_BINARY_BIT_WIDTH: &str = "BinaryBitWidth";

pub const CFG_DEFAULT_BINDINGS: &str = "default_bindings";
pub const CFG_BINDING_CONTROLLER_TYPE: &str = "controller_type";
pub const CFG_BINDING_URL: &str = "binding_url";

// Action collections.
pub const CFG_ACTIONS: &str = "actions";
pub const CFG_XINPUT_ACTIONS: &str = "xinput_actions";

// Singleton toggles, in on-screen order.
pub const CFG_CONTROLLER_TYPE: &str = "ControllerType";
pub const CFG_LEFT_THUMB: &str = "LeftThumb";
pub const CFG_RIGHT_THUMB: &str = "RightThumb";
pub const CFG_LEFT_AB_BUTTONS: &str = "LeftABButtons";
pub const CFG_RIGHT_AB_BUTTONS: &str = "RightABButtons";

// Action entry fields.
pub const CFG_FIELD_NAME: &str = "name";
pub const CFG_FIELD_TYPE: &str = "type";
pub const CFG_FIELD_OSC_PARAMETER: &str = "osc_parameter";
pub const CFG_FIELD_CATEGORY: &str = "category";
pub const CFG_FIELD_ENABLED: &str = "enabled";
pub const CFG_FIELD_ALWAYS: &str = "always";
pub const CFG_FIELD_UNSIGNED: &str = "unsigned";
pub const CFG_FIELD_BINARY: &str = "binary";
pub const CFG_FIELD_FIXED_VALUE: &str = "fixed_value";
pub const CFG_FIELD_FLOATING: &str = "floating";

// Action `type` values.
pub const CFG_TYPE_BOOLEAN: &str = "boolean";
pub const CFG_TYPE_VECTOR1: &str = "vector1";
pub const CFG_TYPE_FLOAT: &str = "float";
pub const CFG_TYPE_VECTOR2: &str = "vector2";
pub const CFG_TYPE_VECTOR3: &str = "vector3";

// Category markers (explicit `category` values, and substrings used for inference).
pub const CFG_CATEGORY_TOUCH: &str = "touch";
pub const CFG_CATEGORY_CLICK: &str = "click";
pub const TRACKER_MARKER: &str = "Tracker";

// English UI strings (EN_ prefix to make future localization easier)
pub const EN_APP_TITLE: &str = "ThumbParams Configurator";

pub const EN_BTN_OPEN: &str = "Open...";
pub const EN_BTN_SAVE: &str = "Save";
pub const EN_BTN_SAVE_AS: &str = "Save As...";
pub const EN_BTN_TOGGLE_THEME: &str = "Theme";
pub const EN_BTN_COPY_MARKDOWN: &str = "Copy table";
pub const EN_BTN_DISMISS: &str = "Dismiss";

pub const EN_FILTER_CONFIG: &str = "ThumbParams config";
pub const EN_STATUS_SAVED: &str = "Saved";
pub const EN_STATUS_COPIED: &str = "Parameter table copied as Markdown";

pub const EN_HOME_INSTRUCTIONS: &str = "Open a ThumbParams config.json to begin.";

pub const EN_HEADING_CONNECTION: &str = "Connection";
pub const EN_HEADING_BULK: &str = "Bulk";
pub const EN_HEADING_PARAMETERS: &str = "Parameters";
pub const EN_HEADING_BINDINGS: &str = "Default bindings";

pub const EN_LABEL_HOST: &str = "IP";
pub const EN_LABEL_PORT: &str = "Port";
pub const EN_LABEL_SERVER_PORT: &str = "Server port";
pub const EN_LABEL_HTTP_PORT: &str = "HTTP port";
pub const EN_LABEL_POLLING_RATE: &str = "Polling rate (Hz)";
pub const EN_LABEL_STICK_TOLERANCE: &str = "Stick tolerance (%)";
pub const EN_LABEL_XINPUT_POLLING_RATE: &str = "XInput polling rate (Hz)";
pub const EN_LABEL_BINARY_BIT_WIDTH: &str = "Binary bit width";
pub const EN_HINT_UNSET: &str = "not set";
pub const EN_LABEL_RECORD_COUNT: &str = "parameters:";

pub const EN_BTN_SELECT_ALL: &str = "Select all";
pub const EN_BTN_CLEAR_ALL: &str = "Clear all";
pub const EN_BTN_CLEAR_TOUCH: &str = "Clear touch";
pub const EN_BTN_CLEAR_CLICK: &str = "Clear click";
pub const EN_BTN_CLEAR_ANALOG: &str = "Clear analog";
pub const EN_BTN_CLEAR_DIGITAL: &str = "Clear digital";
pub const EN_BTN_CLEAR_PRIMARY: &str = "Clear SteamVR";
pub const EN_BTN_CLEAR_EXTENDED: &str = "Clear XInput";
pub const EN_LABEL_SEND_MODE_ALL: &str = "Send mode for all:";

pub const EN_COL_NAME: &str = "Parameter";
pub const EN_COL_TYPE: &str = "Type";
pub const EN_COL_ENABLED: &str = "On";
pub const EN_COL_SEND_MODE: &str = "Send";
pub const EN_COL_UNSIGNED: &str = "Unsigned";
pub const EN_COL_BINARY: &str = "Binary";
pub const EN_COL_FIXED: &str = "Fixed value";
pub const EN_COL_FLOATING: &str = "Hold (s)";
pub const EN_COL_SOURCE: &str = "Source";

pub const EN_SEND_ON_CHANGE: &str = "On change";
pub const EN_SEND_ALWAYS: &str = "Always";
pub const EN_SEND_WHILE_ACTIVE: &str = "While active";

pub const EN_TYPE_INTEGER: &str = "Integer";
pub const EN_TYPE_BOOLEAN: &str = "Boolean";
pub const EN_TYPE_FLOAT: &str = "Float";

pub const EN_SOURCE_SINGLETON: &str = "Toggle";
pub const EN_SOURCE_PRIMARY: &str = "SteamVR";
pub const EN_SOURCE_EXTENDED: &str = "XInput";

pub const EN_ANNOTATION_DERIVED: &str = "derived from paired axis";
pub const EN_BADGE_MODIFIED: &str = "Modified";
pub const EN_BADGE_REFORMAT: &str = "Formatting normalized on save";
pub const EN_WARN_REFORMAT: &str = "This file has comments or custom formatting. Saving an edit \
rewrites it in the standard layout and drops them.";
pub const EN_PLACEHOLDER_UNSAVED: &str = "<unsaved>";
pub const EN_EMPTY: &str = "";

// Markdown export headings.
pub const EN_MD_CONTROLLER: &str = "## SteamVR Controller Parameters";
pub const EN_MD_TRACKER: &str = "## Tracker Parameters";
pub const EN_MD_EXTENDED: &str = "## XInput Parameters";
