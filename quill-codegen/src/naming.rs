//! Generated C symbol names.
//!
//! Every symbol the renderer defines, and every symbol a tag expands to,
//! comes from here so the two always agree.

/// Symbol names for the module and its functions.
#[derive(Debug, Clone, Copy)]
pub struct Naming<'a> {
    prefix: &'a str,
}

impl<'a> Naming<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// Symbols of class `name`.
    pub fn class(&self, name: &str) -> ClassSymbols {
        ClassSymbols::new(self.prefix, name)
    }

    pub fn function(&self, name: &str) -> String {
        format!("{}_function_{}", self.prefix, name)
    }

    pub fn module_def(&self, module: &str) -> String {
        format!("{}_module_{}", self.prefix, module)
    }

    pub fn module_methods(&self, module: &str) -> String {
        format!("{}_module_methods_{}", self.prefix, module)
    }

    pub fn module_doc(&self, module: &str) -> String {
        format!("{}_module_doc_{}", self.prefix, module)
    }

    pub fn create_module(&self, module: &str) -> String {
        format!("{}_create_module_{}", self.prefix, module)
    }

    /// Entry point registering the module with the interpreter.
    pub fn initialize_module(&self, module: &str) -> String {
        format!("initialize_module_{module}")
    }
}

/// Symbol names derived from one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSymbols {
    prefix: String,
    name: String,
}

impl ClassSymbols {
    pub fn new(prefix: &str, name: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
        }
    }

    /// The plain class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance struct, `X_struct`.
    pub fn instance_struct(&self) -> String {
        format!("{}_struct", self.name)
    }

    /// Type object, `X_type_struct`.
    pub fn type_struct(&self) -> String {
        format!("{}_type_struct", self.name)
    }

    pub fn new_fn(&self) -> String {
        self.symbol("new")
    }

    pub fn dealloc_fn(&self) -> String {
        self.symbol("dealloc")
    }

    pub fn copy_fn(&self) -> String {
        self.symbol("copy")
    }

    pub fn richcompare_fn(&self) -> String {
        self.symbol("richcompare")
    }

    pub fn methods_table(&self) -> String {
        self.symbol("methods")
    }

    pub fn getset_table(&self) -> String {
        self.symbol("getset")
    }

    pub fn number_table(&self) -> String {
        self.symbol("number")
    }

    pub fn sequence_table(&self) -> String {
        self.symbol("sequence")
    }

    pub fn doc(&self) -> String {
        self.symbol("doc")
    }

    pub fn method(&self, method: &str) -> String {
        format!("{}_method_{}_{}", self.prefix, self.name, method)
    }

    pub fn getter(&self, property: &str) -> String {
        format!("{}_get_{}_{}", self.prefix, self.name, property)
    }

    pub fn setter(&self, property: &str) -> String {
        format!("{}_set_{}_{}", self.prefix, self.name, property)
    }

    /// Entry point adding the type to a module.
    pub fn initialize_fn(&self) -> String {
        format!("initialize_class_{}", self.name)
    }

    /// Instance member function holding the aggregated `NEW` fragments.
    pub fn on_new(&self) -> String {
        format!("{}_on_new", self.prefix)
    }

    pub fn on_free(&self) -> String {
        format!("{}_on_free", self.prefix)
    }

    pub fn on_copy(&self) -> String {
        format!("{}_on_copy", self.prefix)
    }

    /// Expression allocating a fresh instance.
    pub fn new_expr(&self) -> String {
        format!(
            "{}({}(&{}, NULL, NULL))",
            self.cast_prefix(),
            self.new_fn(),
            self.type_struct()
        )
    }

    pub fn copy_expr(&self, object: &str) -> String {
        format!("{}({})", self.copy_fn(), self.cast_expr(object))
    }

    pub fn is_instance_expr(&self, object: &str) -> String {
        format!(
            "PyObject_TypeCheck(reinterpret_cast<PyObject*>({}), &{})",
            object,
            self.type_struct()
        )
    }

    pub fn cast_expr(&self, object: &str) -> String {
        format!("{}({})", self.cast_prefix(), object)
    }

    fn cast_prefix(&self) -> String {
        format!("reinterpret_cast<{}*>", self.instance_struct())
    }

    fn symbol(&self, what: &str) -> String {
        format!("{}_{}_{}", self.prefix, what, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_symbols() {
        let abel = Naming::new("quill").class("Abel");
        assert_eq!(abel.instance_struct(), "Abel_struct");
        assert_eq!(abel.type_struct(), "Abel_type_struct");
        assert_eq!(abel.new_fn(), "quill_new_Abel");
        assert_eq!(abel.method("spawn"), "quill_method_Abel_spawn");
        assert_eq!(abel.getter("wisdom"), "quill_get_Abel_wisdom");
        assert_eq!(abel.initialize_fn(), "initialize_class_Abel");
    }

    #[test]
    fn test_expressions() {
        let x = Naming::new("quill").class("X");
        assert_eq!(
            x.new_expr(),
            "reinterpret_cast<X_struct*>(quill_new_X(&X_type_struct, NULL, NULL))"
        );
        assert_eq!(x.copy_expr("o"), "quill_copy_X(reinterpret_cast<X_struct*>(o))");
        assert_eq!(
            x.is_instance_expr("o"),
            "PyObject_TypeCheck(reinterpret_cast<PyObject*>(o), &X_type_struct)"
        );
    }

    #[test]
    fn test_module_symbols() {
        let naming = Naming::new("p");
        assert_eq!(naming.function("add"), "p_function_add");
        assert_eq!(naming.create_module("m"), "p_create_module_m");
        assert_eq!(naming.initialize_module("m"), "initialize_module_m");
    }
}
