//! String encodings shared with the IIS metabase.
//!
//! Permission flags arrive as a short options string (`"rbdi"`, `"x-r"`) and
//! the filter load order is a comma separated list. Both are parsed into
//! structured values here and serialized back only at the boundary.

use std::fmt;

/// Appended to the caller's options to force an execute-only directory.
pub const EXEC_ONLY_OVERRIDE: &str = "+x-r-i-b-d";

/// True if `name` is present in `options` and not disabled with a `-` prefix
/// anywhere in the string.
pub fn has_option(options: &str, name: char) -> bool {
    options.contains(name) && !options.contains(&format!("-{name}"))
}

/// Returns `options` with the execute-only override appended.
pub fn exec_only(options: &str) -> String {
    format!("{options}{EXEC_ONLY_OVERRIDE}")
}

/// Access and browsing settings of a virtual directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessFlags {
    pub execute: bool,
    pub read: bool,
    pub write: bool,
    pub script: bool,
    pub index: bool,
    pub browse: bool,
    pub default_doc: bool,
}

impl AccessFlags {
    pub fn parse(options: &str) -> Self {
        Self {
            execute: has_option(options, 'x'),
            read: has_option(options, 'r'),
            write: has_option(options, 'w'),
            script: has_option(options, 's'),
            index: has_option(options, 'i'),
            browse: has_option(options, 'b'),
            default_doc: has_option(options, 'd'),
        }
    }

    /// Metabase property names paired with their values.
    pub fn properties(&self) -> [(&'static str, bool); 7] {
        [
            ("AccessExecute", self.execute),
            ("AccessRead", self.read),
            ("AccessWrite", self.write),
            ("AccessScript", self.script),
            ("ContentIndexed", self.index),
            ("EnableDirBrowsing", self.browse),
            ("EnableDefaultDoc", self.default_doc),
        ]
    }
}

/// Ordered list of filter names from `FilterLoadOrder`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOrder(Vec<String>);

impl LoadOrder {
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Appends `name` unless already present. Returns whether the list changed.
    pub fn push(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.0.push(name.to_owned());
        true
    }

    /// Removes every occurrence of `name`. Returns whether the list changed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|n| n != name);
        self.0.len() != before
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for LoadOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}
