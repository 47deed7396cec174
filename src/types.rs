/// Installation settings, pre-populated with defaults and overridden from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    /// `ServerComment` of the target web site.
    pub server_name: String,
    pub web_description: String,
    pub filter_name: String,
    pub filter_desc: String,
    /// Name of the virtual directory created under the site's ROOT.
    pub web_name: String,
    pub headers: String,
    /// Permission flags, see [`crate::flags::AccessFlags`].
    pub web_options: String,
    pub registry_key: String,
    pub app_protection: AppProtection,
    /// Directory that contains the filter library.
    pub web_path: String,
    pub filter_lib: String,
}

pub const DEFAULT_SERVER_NAME: &str = "Default Web Site";
pub const DEFAULT_DESCRIPTION: &str = "JK2 ISAPI Redirector";
pub const DEFAULT_FILTER_NAME: &str = "jakarta";
pub const DEFAULT_HEADERS: &str = "X-Powered-By: Apache Software Foundation";
pub const DEFAULT_OPTIONS: &str = "rbdi";
pub const DEFAULT_REGISTRY: &str =
    r"HKLM\SOFTWARE\Apache Software Foundation\Jakarta Isapi Redirector\2.0";
pub const DEFAULT_FILTER_LIB: &str = "isapi_redirector2.dll";

impl Default for Parameters {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_owned(),
            web_description: DEFAULT_DESCRIPTION.to_owned(),
            filter_name: DEFAULT_FILTER_NAME.to_owned(),
            filter_desc: DEFAULT_DESCRIPTION.to_owned(),
            web_name: DEFAULT_FILTER_NAME.to_owned(),
            headers: DEFAULT_HEADERS.to_owned(),
            web_options: DEFAULT_OPTIONS.to_owned(),
            registry_key: DEFAULT_REGISTRY.to_owned(),
            app_protection: AppProtection::Pooled,
            web_path: "C:".to_owned(),
            filter_lib: DEFAULT_FILTER_LIB.to_owned(),
        }
    }
}

impl Parameters {
    /// Value stored in the filter's `FilterPath` property.
    pub fn filter_path(&self) -> String {
        format!(r"{}\{}", self.web_path, self.filter_lib)
    }
}

/// Application isolation mode passed to `AppCreate2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppProtection {
    InProc = 0,
    OutProc = 1,
    Pooled = 2,
}

// IIS metabase object classes and fixed names
pub const IIS_SERVICE_PATH: &str = "IIS://LocalHost/W3SVC";
pub const IIS_SERVER: &str = "IIsWebServer";
pub const IIS_WEBDIR: &str = "IIsWebVirtualDir";
pub const IIS_FILTERS: &str = "IIsFilters";
pub const IIS_FILTER: &str = "IIsFilter";
pub const ROOT_DIR_NAME: &str = "ROOT";
pub const FILTERS_NAME: &str = "Filters";

/// A metabase property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Str(String),
    Bool(bool),
    Int(i32),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Str(s.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Str(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}
