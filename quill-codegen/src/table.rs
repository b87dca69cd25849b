//! Column-aligned initializers for fixed-schema C structs.

use indexmap::IndexMap;

/// One schema entry: a struct field and its C type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: &'static str,
}

impl Field {
    pub const fn new(name: &'static str, ty: &'static str) -> Self {
        Self { name, ty }
    }

    /// The value written when no override is given.
    pub fn zero(&self) -> &'static str {
        match self.ty {
            "Py_ssize_t" | "unsigned long" | "unsigned int" | "int" | "long" => "0",
            _ => "NULL",
        }
    }
}

/// A struct initializer rendered from a schema and sparse overrides.
///
/// Lines always follow the schema order. Fields without an override get
/// [`Field::zero`].
#[derive(Debug, Clone)]
pub struct StructTable<'a> {
    ty: &'a str,
    name: &'a str,
    schema: &'a [Field],
    storage: Option<&'a str>,
    head: Option<&'a str>,
    overrides: IndexMap<&'a str, String>,
}

impl<'a> StructTable<'a> {
    pub fn new(ty: &'a str, name: &'a str, schema: &'a [Field]) -> Self {
        Self {
            ty,
            name,
            schema,
            storage: Some("static"),
            head: None,
            overrides: IndexMap::new(),
        }
    }

    /// Storage qualifier before the type, `static` unless changed.
    pub fn storage(mut self, storage: Option<&'a str>) -> Self {
        self.storage = storage;
        self
    }

    /// A verbatim line emitted before the fields.
    pub fn head(mut self, head: &'a str) -> Self {
        self.head = Some(head);
        self
    }

    /// Override the value of `field`.
    pub fn set(mut self, field: &'a str, value: impl Into<String>) -> Self {
        self.overrides.insert(field, value.into());
        self
    }

    /// Override several fields at once.
    pub fn set_all<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Into<String>,
    {
        for (field, value) in values {
            self.overrides.insert(field, value.into());
        }
        self
    }

    pub fn render(&self) -> String {
        for field in self.overrides.keys() {
            if !self.schema.iter().any(|f| f.name == *field) {
                tracing::warn!(table = self.name, field, "override for unknown field ignored");
            }
        }

        let name_width = self.schema.iter().map(|f| f.name.len()).max().unwrap_or(0) + 6;
        let type_width = self.schema.iter().map(|f| f.ty.len()).max().unwrap_or(0) + 2;

        let mut lines = Vec::with_capacity(self.schema.len() + 4);
        lines.push(match self.storage {
            Some(storage) => format!("{} {} {} =", storage, self.ty, self.name),
            None => format!("{} {} =", self.ty, self.name),
        });
        lines.push("{".to_string());
        if let Some(head) = self.head {
            lines.push(format!("    {head}"));
        }

        let last = self.schema.len().saturating_sub(1);
        for (i, field) in self.schema.iter().enumerate() {
            let value = self
                .overrides
                .get(field.name)
                .map(String::as_str)
                .unwrap_or_else(|| field.zero());
            let comma = if i == last { "" } else { "," };
            lines.push(format!(
                "    {:<name_width$} {:<type_width$} ({}){}",
                format!("/* {} */", field.name),
                format!("({})", field.ty),
                value,
                comma,
            ));
        }

        lines.push(format!("}}; /* {} */", self.name));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[Field] = &[
        Field::new("tp_name", "const char*"),
        Field::new("tp_basicsize", "Py_ssize_t"),
        Field::new("tp_dealloc", "destructor"),
    ];

    #[test]
    fn test_render_aligned() {
        let table = StructTable::new("PyTypeObject", "X_type_struct", SCHEMA)
            .head("PyVarObject_HEAD_INIT(NULL, 0)")
            .set("tp_dealloc", "quill_dealloc_X")
            .set("tp_name", "\"m.X\"");

        insta::assert_snapshot!(table.render(), @r#"
        static PyTypeObject X_type_struct =
        {
            PyVarObject_HEAD_INIT(NULL, 0)
            /* tp_name */      (const char*) ("m.X"),
            /* tp_basicsize */ (Py_ssize_t)  (0),
            /* tp_dealloc */   (destructor)  (quill_dealloc_X)
        }; /* X_type_struct */
        "#);
    }

    #[test]
    fn test_schema_order_wins() {
        let rendered = StructTable::new("S", "s", SCHEMA)
            .set_all([("tp_dealloc", "d"), ("tp_name", "n")])
            .render();
        let name = rendered.find("(n)").unwrap();
        let dealloc = rendered.find("(d)").unwrap();
        assert!(name < dealloc);
    }

    #[test]
    fn test_unknown_override_ignored() {
        let rendered = StructTable::new("S", "s", SCHEMA)
            .set("tp_bogus", "x")
            .render();
        assert!(!rendered.contains("tp_bogus"));
        assert_eq!(rendered.matches("(NULL)").count(), 2);
    }

    #[test]
    fn test_without_storage() {
        let rendered = StructTable::new("PyTypeObject", "T", SCHEMA)
            .storage(None)
            .render();
        assert!(rendered.starts_with("PyTypeObject T =\n{\n"));
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(Field::new("a", "long").zero(), "0");
        assert_eq!(Field::new("a", "reprfunc").zero(), "NULL");
    }
}
