use crate::{
    CodeBuilder, Result,
    abi::{PY_NUMBER_METHODS, PY_SEQUENCE_METHODS, PY_TYPE_OBJECT, SlotTable},
    annotation::FragmentKey,
    entity::{Class, ClassId, Function, Property},
    naming::ClassSymbols,
    table::StructTable,
    tags::FragmentSite,
};

use super::{
    MethodEntry, MethodKind, ModuleRenderer, doc_symbol, push_doc, push_method_table,
    push_position,
};

const STRUCT_LAYOUT: &str = "\
struct %(struct)s
{
    PyObject_HEAD
    %(fields)s

    void %(on_new)s()
    {
        %(new)s
    }

    void %(on_free)s()
    {
        %(free)s
    }

    void %(on_copy)s(%(struct)s* copy)
    {
        %(copy)s
    }
};";

const LIFECYCLE: &str = "\
PyObject* %(new_fn)s(PyTypeObject* type, PyObject* args, PyObject* kwargs)
{
    %(struct)s* self = reinterpret_cast<%(struct)s*>(type->tp_alloc(type, 0));
    if (self != NULL)
        self->%(on_new)s();
    return reinterpret_cast<PyObject*>(self);
}

void %(dealloc_fn)s(%(struct)s* self)
{
    self->%(on_free)s();
    Py_TYPE(self)->tp_free(reinterpret_cast<PyObject*>(self));
}

%(struct)s* %(copy_fn)s(%(struct)s* self)
{
    %(struct)s* copy = %(new_expr)s;
    if (copy != NULL)
        self->%(on_copy)s(copy);
    return copy;
}";

const REGISTRATION: &str = "\
bool %(init_fn)s(PyObject* module)
{
    if (PyType_Ready(&%(type_struct)s) < 0)
        return false;
    Py_INCREF(&%(type_struct)s);
    if (PyModule_AddObject(module, \"%(name)s\", reinterpret_cast<PyObject*>(&%(type_struct)s)) < 0)
    {
        Py_DECREF(&%(type_struct)s);
        return false;
    }
    return true;
}";

/// Renders the parts of one included class.
pub(super) struct ClassRenderer<'r, 'g> {
    renderer: &'r ModuleRenderer<'g>,
    id: ClassId,
    class: &'g Class,
    symbols: ClassSymbols,
}

impl<'r, 'g> ClassRenderer<'r, 'g> {
    pub(super) fn new(renderer: &'r ModuleRenderer<'g>, id: ClassId) -> Self {
        let class = renderer.graph().class(id);
        Self {
            renderer,
            id,
            class,
            symbols: renderer.naming().class(&class.name),
        }
    }

    pub(super) fn symbols(&self) -> &ClassSymbols {
        &self.symbols
    }

    pub(super) fn push_forward_declarations(&self, b: &mut CodeBuilder) {
        let s = &self.symbols;
        let instance = s.instance_struct();
        b.push_line(&format!("struct {instance};"));
        b.push_line(&format!("extern PyTypeObject {};", s.type_struct()));
        b.push_line(&format!(
            "PyObject* {}(PyTypeObject* type, PyObject* args, PyObject* kwargs);",
            s.new_fn()
        ));
        b.push_line(&format!("void {}({instance}* self);", s.dealloc_fn()));
        b.push_line(&format!("{instance}* {}({instance}* self);", s.copy_fn()));
        b.push_blank();
    }

    pub(super) fn push_struct(&self, b: &mut CodeBuilder) -> Result<()> {
        let s = &self.symbols;
        let fields = self.effective(FragmentKey::Default)?;
        let new = self.effective(FragmentKey::New)?;
        let free = self.effective(FragmentKey::Free)?;
        let copy = self.effective(FragmentKey::Copy)?;

        push_position(b, &self.class.position);
        let text = self.renderer.substitutor().substitute(
            STRUCT_LAYOUT,
            &[
                ("struct", s.instance_struct().as_str()),
                ("fields", fields.as_str()),
                ("on_new", s.on_new().as_str()),
                ("new", new.as_str()),
                ("on_free", s.on_free().as_str()),
                ("free", free.as_str()),
                ("on_copy", s.on_copy().as_str()),
                ("copy", copy.as_str()),
            ],
        );
        b.push_text(&text);
        b.push_blank();
        Ok(())
    }

    pub(super) fn push_bodies(&self, b: &mut CodeBuilder) -> Result<()> {
        let receiver = format!("{}*", self.symbols.instance_struct());
        push_doc(b, &self.symbols.doc(), &self.class.description);

        for method in self.class.included_methods() {
            let kind = MethodKind::of(method);
            let symbol = self.symbols.method(&method.name);
            push_position(b, &method.position);
            if matches!(kind, MethodKind::Plain(_)) {
                push_doc(b, &doc_symbol(&symbol), &method.description);
            }
            let header = kind.signature(&symbol, &receiver);
            self.renderer.push_body(b, &header, method, Some(self.id))?;
            b.push_blank();
        }

        for property in self.class.included_properties() {
            self.push_property(b, property, &receiver)?;
        }

        self.push_richcompare(b, &receiver);

        let s = &self.symbols;
        let lifecycle = self.renderer.substitutor().substitute(
            LIFECYCLE,
            &[
                ("new_fn", s.new_fn().as_str()),
                ("struct", s.instance_struct().as_str()),
                ("on_new", s.on_new().as_str()),
                ("dealloc_fn", s.dealloc_fn().as_str()),
                ("on_free", s.on_free().as_str()),
                ("copy_fn", s.copy_fn().as_str()),
                ("new_expr", s.new_expr().as_str()),
                ("on_copy", s.on_copy().as_str()),
            ],
        );
        b.push_text(&lifecycle);
        b.push_blank();
        Ok(())
    }

    fn push_property(&self, b: &mut CodeBuilder, property: &Property, receiver: &str) -> Result<()> {
        push_position(b, &property.position);
        let getter = self.symbols.getter(&property.name);
        push_doc(b, &doc_symbol(&getter), &property.description);

        if let Some(fragment) = property.getter() {
            let header = format!("PyObject* {getter}({receiver} self, void*)");
            let site = self.property_site(property, fragment.key, fragment.offset);
            self.renderer.push_block(b, &header, &fragment.body, &site)?;
        }
        if let Some(fragment) = property.setter() {
            let setter = self.symbols.setter(&property.name);
            let header = format!("int {setter}({receiver} self, PyObject* arg1, void*)");
            let site = self.property_site(property, fragment.key, fragment.offset);
            self.renderer.push_block(b, &header, &fragment.body, &site)?;
        } else if property.has_setter {
            tracing::debug!(
                property = %property.qualified_name,
                "setter discovered without a SET fragment, property is read-only"
            );
        }
        b.push_blank();
        Ok(())
    }

    fn property_site<'p>(&self, property: &'p Property, key: FragmentKey, offset: usize) -> FragmentSite<'p> {
        FragmentSite {
            entity: &property.qualified_name,
            key,
            position: &property.position,
            doc: &property.doc,
            offset,
            class: Some(self.id),
        }
    }

    fn compare_methods(&self) -> Vec<(&'static str, &'g Function)> {
        self.class
            .included_methods()
            .filter_map(|method| match MethodKind::of(method) {
                MethodKind::Compare(op) => Some((op, method)),
                _ => None,
            })
            .collect()
    }

    fn push_richcompare(&self, b: &mut CodeBuilder, receiver: &str) {
        let methods = self.compare_methods();
        if methods.is_empty() {
            return;
        }
        let header = format!(
            "PyObject* {}({receiver} self, PyObject* arg1, int arg2)",
            self.symbols.richcompare_fn()
        );
        b.push_line(&header);
        b.push_line("{");
        {
            let mut b = b.indented();
            b.push_line("switch (arg2)");
            b.push_line("{");
            {
                let mut b = b.indented();
                for (op, method) in &methods {
                    b.push_line(&format!(
                        "case {}: return {}(self, arg1, arg2);",
                        op,
                        self.symbols.method(&method.name)
                    ));
                }
                b.push_line("default: Py_RETURN_NOTIMPLEMENTED;");
            }
            b.push_line("}");
        }
        b.push_line("}");
        b.push_blank();
    }

    /// Slot overrides for `table`, as (field, function) pairs.
    fn slots(&self, table: SlotTable) -> Vec<(&'static str, String)> {
        self.class
            .included_methods()
            .filter_map(|method| match MethodKind::of(method) {
                MethodKind::Slot(slot) if slot.table == table => {
                    Some((slot.field, self.symbols.method(&method.name)))
                }
                _ => None,
            })
            .collect()
    }

    pub(super) fn push_tables(&self, b: &mut CodeBuilder) -> Result<()> {
        let s = &self.symbols;

        let methods: Vec<MethodEntry> = self
            .class
            .included_methods()
            .filter_map(|method| match MethodKind::of(method) {
                MethodKind::Plain(convention) => {
                    let function = s.method(&method.name);
                    Some(MethodEntry {
                        name: method.name.clone(),
                        flags: convention.flags(),
                        doc: (!method.description.is_empty()).then(|| doc_symbol(&function)),
                        function,
                    })
                }
                _ => None,
            })
            .collect();
        push_method_table(b, &s.methods_table(), &methods);
        self.push_getset_table(b);

        let mut type_slots = self.slots(SlotTable::Type);

        let number = self.slots(SlotTable::Number);
        let number_name = s.number_table();
        if !number.is_empty() {
            let table = StructTable::new("PyNumberMethods", &number_name, PY_NUMBER_METHODS)
                .set_all(number.iter().map(|(field, value)| (*field, value.as_str())));
            b.push_text(&table.render());
            b.push_blank();
            type_slots.push(("tp_as_number", format!("&{number_name}")));
        }

        let sequence = self.slots(SlotTable::Sequence);
        let sequence_name = s.sequence_table();
        if !sequence.is_empty() {
            let table = StructTable::new("PySequenceMethods", &sequence_name, PY_SEQUENCE_METHODS)
                .set_all(sequence.iter().map(|(field, value)| (*field, value.as_str())));
            b.push_text(&table.render());
            b.push_blank();
            type_slots.push(("tp_as_sequence", format!("&{sequence_name}")));
        }

        if !self.compare_methods().is_empty() {
            type_slots.push(("tp_richcompare", s.richcompare_fn()));
        }

        let module = &self.renderer.graph().module().name;
        let doc = if self.class.description.is_empty() {
            "NULL".to_string()
        } else {
            s.doc()
        };
        let type_name = s.type_struct();
        let table = StructTable::new("PyTypeObject", &type_name, PY_TYPE_OBJECT)
            .storage(None)
            .head("PyVarObject_HEAD_INIT(NULL, 0)")
            .set("tp_name", format!("\"{}.{}\"", module, self.class.name))
            .set("tp_basicsize", format!("sizeof({})", s.instance_struct()))
            .set("tp_dealloc", s.dealloc_fn())
            .set("tp_flags", "Py_TPFLAGS_DEFAULT | Py_TPFLAGS_BASETYPE")
            .set("tp_doc", doc)
            .set("tp_methods", s.methods_table())
            .set("tp_getset", s.getset_table())
            .set("tp_new", s.new_fn())
            .set_all(type_slots);
        b.push_text(&table.render());
        b.push_blank();
        Ok(())
    }

    fn push_getset_table(&self, b: &mut CodeBuilder) {
        let s = &self.symbols;
        let symbol = s.getset_table();
        b.push_line(&format!("static PyGetSetDef {symbol}[] ="));
        b.push_line("{");
        {
            let mut b = b.indented();
            for property in self.class.included_properties() {
                let getter = s.getter(&property.name);
                let doc = if property.description.is_empty() {
                    "NULL".to_string()
                } else {
                    format!("(char*){}", doc_symbol(&getter))
                };
                let getter = match property.getter() {
                    Some(_) => getter,
                    None => "NULL".to_string(),
                };
                let setter = match property.setter() {
                    Some(_) => s.setter(&property.name),
                    None => "NULL".to_string(),
                };
                b.push_line(&format!(
                    "{{ (char*)\"{}\", (getter){}, (setter){}, {}, NULL }},",
                    property.name, getter, setter, doc
                ));
            }
            b.push_line("{ NULL, NULL, NULL, NULL, NULL }");
        }
        b.push_line(&format!("}}; /* {symbol} */"));
        b.push_blank();
    }

    pub(super) fn push_registration(&self, b: &mut CodeBuilder) {
        let s = &self.symbols;
        let text = self.renderer.substitutor().substitute(
            REGISTRATION,
            &[
                ("init_fn", s.initialize_fn().as_str()),
                ("type_struct", s.type_struct().as_str()),
                ("name", self.class.name.as_str()),
            ],
        );
        b.push_text(&text);
        b.push_blank();
    }

    /// The aggregated fragments for `key`, base first, resolved at column 0.
    fn effective(&self, key: FragmentKey) -> Result<String> {
        let graph = self.renderer.graph();
        let mut parts = Vec::new();
        for (ancestor, fragment) in graph.effective_fragments(self.id, key) {
            let owner = graph.class(ancestor);
            let site = FragmentSite {
                entity: &self.class.name,
                key,
                position: &owner.position,
                doc: &owner.doc,
                offset: fragment.offset,
                class: Some(self.id),
            };
            let text = self.renderer.resolver().resolve(&fragment.body, &site, 0)?;
            if !text.is_empty() {
                parts.push(text);
            }
        }
        Ok(parts.join("\n"))
    }
}
