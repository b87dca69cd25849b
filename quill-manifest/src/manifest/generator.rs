use serde::Deserialize;

/// Generator settings from the `[generator]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Marker word that introduces a fragment (`_CPP_:` / `_CPP_(KEY):`)
    pub marker: String,

    /// Prefix of every generated C symbol
    pub prefix: String,

    /// Spaces per indent level
    pub indent_width: u8,

    /// Tab expansion width used when reindenting fragments
    pub tab_width: u8,

    /// Whether derived classes receive the methods and properties of their bases
    pub inherit_members: bool,

    /// Header included at the top of the interface file
    pub python_header: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            marker: "_CPP_".to_string(),
            prefix: "quill".to_string(),
            indent_width: 4,
            tab_width: 4,
            inherit_members: true,
            python_header: "Python.h".to_string(),
        }
    }
}
