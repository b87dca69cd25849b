//! Static CPython ABI data: struct layouts, function pointer types and the
//! special-method slot tables.

use self::SlotTable::{Number, Sequence, Type};
use crate::table::Field;

/// A CPython function pointer typedef.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionType {
    pub name: &'static str,
    pub ret: &'static str,
    pub params: &'static [&'static str],
}

impl FunctionType {
    const fn new(name: &'static str, ret: &'static str, params: &'static [&'static str]) -> Self {
        Self { name, ret, params }
    }

    /// Definition header for `symbol` with the receiver typed as `receiver`.
    ///
    /// Parameters are named `self`, `arg1`, `arg2`, ...; `void*` closure
    /// parameters stay unnamed.
    pub fn signature(&self, symbol: &str, receiver: &str) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| match (i, *ty) {
                (0, "PyObject*") => format!("{receiver} self"),
                (_, "void*") => "void*".to_string(),
                (i, ty) => format!("{ty} arg{i}"),
            })
            .collect();
        format!("{} {}({})", self.ret, symbol, params.join(", "))
    }
}

pub const FUNCTIONS: &[FunctionType] = &[
    FunctionType::new("unaryfunc", "PyObject*", &["PyObject*"]),
    FunctionType::new("binaryfunc", "PyObject*", &["PyObject*", "PyObject*"]),
    FunctionType::new("ternaryfunc", "PyObject*", &["PyObject*", "PyObject*", "PyObject*"]),
    FunctionType::new("inquiry", "int", &["PyObject*"]),
    FunctionType::new("lenfunc", "Py_ssize_t", &["PyObject*"]),
    FunctionType::new("ssizeargfunc", "PyObject*", &["PyObject*", "Py_ssize_t"]),
    FunctionType::new("ssizessizeargfunc", "PyObject*", &["PyObject*", "Py_ssize_t", "Py_ssize_t"]),
    FunctionType::new("ssizeobjargproc", "int", &["PyObject*", "Py_ssize_t", "PyObject*"]),
    FunctionType::new("objobjargproc", "int", &["PyObject*", "PyObject*", "PyObject*"]),
    FunctionType::new("objobjproc", "int", &["PyObject*", "PyObject*"]),
    FunctionType::new("freefunc", "void", &["void*"]),
    FunctionType::new("destructor", "void", &["PyObject*"]),
    FunctionType::new("getattrfunc", "PyObject*", &["PyObject*", "char*"]),
    FunctionType::new("getattrofunc", "PyObject*", &["PyObject*", "PyObject*"]),
    FunctionType::new("setattrfunc", "int", &["PyObject*", "char*", "PyObject*"]),
    FunctionType::new("setattrofunc", "int", &["PyObject*", "PyObject*", "PyObject*"]),
    FunctionType::new("reprfunc", "PyObject*", &["PyObject*"]),
    FunctionType::new("hashfunc", "Py_hash_t", &["PyObject*"]),
    FunctionType::new("richcmpfunc", "PyObject*", &["PyObject*", "PyObject*", "int"]),
    FunctionType::new("getiterfunc", "PyObject*", &["PyObject*"]),
    FunctionType::new("iternextfunc", "PyObject*", &["PyObject*"]),
    FunctionType::new("descrgetfunc", "PyObject*", &["PyObject*", "PyObject*", "PyObject*"]),
    FunctionType::new("descrsetfunc", "int", &["PyObject*", "PyObject*", "PyObject*"]),
    FunctionType::new("initproc", "int", &["PyObject*", "PyObject*", "PyObject*"]),
    FunctionType::new("newfunc", "PyObject*", &["PyTypeObject*", "PyObject*", "PyObject*"]),
    FunctionType::new("allocfunc", "PyObject*", &["PyTypeObject*", "Py_ssize_t"]),
    FunctionType::new("getter", "PyObject*", &["PyObject*", "void*"]),
    FunctionType::new("setter", "int", &["PyObject*", "PyObject*", "void*"]),
];

/// Look up a function pointer typedef by name.
pub fn function_type(name: &str) -> Option<&'static FunctionType> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

pub const PY_TYPE_OBJECT: &[Field] = &[
    Field::new("tp_name", "const char*"),
    Field::new("tp_basicsize", "Py_ssize_t"),
    Field::new("tp_itemsize", "Py_ssize_t"),
    Field::new("tp_dealloc", "destructor"),
    Field::new("tp_vectorcall_offset", "Py_ssize_t"),
    Field::new("tp_getattr", "getattrfunc"),
    Field::new("tp_setattr", "setattrfunc"),
    Field::new("tp_as_async", "PyAsyncMethods*"),
    Field::new("tp_repr", "reprfunc"),
    Field::new("tp_as_number", "PyNumberMethods*"),
    Field::new("tp_as_sequence", "PySequenceMethods*"),
    Field::new("tp_as_mapping", "PyMappingMethods*"),
    Field::new("tp_hash", "hashfunc"),
    Field::new("tp_call", "ternaryfunc"),
    Field::new("tp_str", "reprfunc"),
    Field::new("tp_getattro", "getattrofunc"),
    Field::new("tp_setattro", "setattrofunc"),
    Field::new("tp_as_buffer", "PyBufferProcs*"),
    Field::new("tp_flags", "unsigned long"),
    Field::new("tp_doc", "const char*"),
    Field::new("tp_traverse", "traverseproc"),
    Field::new("tp_clear", "inquiry"),
    Field::new("tp_richcompare", "richcmpfunc"),
    Field::new("tp_weaklistoffset", "Py_ssize_t"),
    Field::new("tp_iter", "getiterfunc"),
    Field::new("tp_iternext", "iternextfunc"),
    Field::new("tp_methods", "struct PyMethodDef*"),
    Field::new("tp_members", "struct PyMemberDef*"),
    Field::new("tp_getset", "struct PyGetSetDef*"),
    Field::new("tp_base", "PyTypeObject*"),
    Field::new("tp_dict", "PyObject*"),
    Field::new("tp_descr_get", "descrgetfunc"),
    Field::new("tp_descr_set", "descrsetfunc"),
    Field::new("tp_dictoffset", "Py_ssize_t"),
    Field::new("tp_init", "initproc"),
    Field::new("tp_alloc", "allocfunc"),
    Field::new("tp_new", "newfunc"),
    Field::new("tp_free", "freefunc"),
    Field::new("tp_is_gc", "inquiry"),
    Field::new("tp_bases", "PyObject*"),
    Field::new("tp_mro", "PyObject*"),
    Field::new("tp_cache", "PyObject*"),
    Field::new("tp_subclasses", "PyObject*"),
    Field::new("tp_weaklist", "PyObject*"),
    Field::new("tp_del", "destructor"),
    Field::new("tp_version_tag", "unsigned int"),
    Field::new("tp_finalize", "destructor"),
    Field::new("tp_vectorcall", "vectorcallfunc"),
];

pub const PY_NUMBER_METHODS: &[Field] = &[
    Field::new("nb_add", "binaryfunc"),
    Field::new("nb_subtract", "binaryfunc"),
    Field::new("nb_multiply", "binaryfunc"),
    Field::new("nb_remainder", "binaryfunc"),
    Field::new("nb_divmod", "binaryfunc"),
    Field::new("nb_power", "ternaryfunc"),
    Field::new("nb_negative", "unaryfunc"),
    Field::new("nb_positive", "unaryfunc"),
    Field::new("nb_absolute", "unaryfunc"),
    Field::new("nb_bool", "inquiry"),
    Field::new("nb_invert", "unaryfunc"),
    Field::new("nb_lshift", "binaryfunc"),
    Field::new("nb_rshift", "binaryfunc"),
    Field::new("nb_and", "binaryfunc"),
    Field::new("nb_xor", "binaryfunc"),
    Field::new("nb_or", "binaryfunc"),
    Field::new("nb_int", "unaryfunc"),
    Field::new("nb_reserved", "void*"),
    Field::new("nb_float", "unaryfunc"),
    Field::new("nb_inplace_add", "binaryfunc"),
    Field::new("nb_inplace_subtract", "binaryfunc"),
    Field::new("nb_inplace_multiply", "binaryfunc"),
    Field::new("nb_inplace_remainder", "binaryfunc"),
    Field::new("nb_inplace_power", "ternaryfunc"),
    Field::new("nb_inplace_lshift", "binaryfunc"),
    Field::new("nb_inplace_rshift", "binaryfunc"),
    Field::new("nb_inplace_and", "binaryfunc"),
    Field::new("nb_inplace_xor", "binaryfunc"),
    Field::new("nb_inplace_or", "binaryfunc"),
    Field::new("nb_floor_divide", "binaryfunc"),
    Field::new("nb_true_divide", "binaryfunc"),
    Field::new("nb_inplace_floor_divide", "binaryfunc"),
    Field::new("nb_inplace_true_divide", "binaryfunc"),
    Field::new("nb_index", "unaryfunc"),
    Field::new("nb_matrix_multiply", "binaryfunc"),
    Field::new("nb_inplace_matrix_multiply", "binaryfunc"),
];

pub const PY_SEQUENCE_METHODS: &[Field] = &[
    Field::new("sq_length", "lenfunc"),
    Field::new("sq_concat", "binaryfunc"),
    Field::new("sq_repeat", "ssizeargfunc"),
    Field::new("sq_item", "ssizeargfunc"),
    Field::new("was_sq_slice", "void*"),
    Field::new("sq_ass_item", "ssizeobjargproc"),
    Field::new("was_sq_ass_slice", "void*"),
    Field::new("sq_contains", "objobjproc"),
    Field::new("sq_inplace_concat", "binaryfunc"),
    Field::new("sq_inplace_repeat", "ssizeargfunc"),
];

pub const PY_MODULE_DEF: &[Field] = &[
    Field::new("m_name", "const char*"),
    Field::new("m_doc", "const char*"),
    Field::new("m_size", "Py_ssize_t"),
    Field::new("m_methods", "PyMethodDef*"),
    Field::new("m_slots", "PyModuleDef_Slot*"),
    Field::new("m_traverse", "traverseproc"),
    Field::new("m_clear", "inquiry"),
    Field::new("m_free", "freefunc"),
];

/// The struct a special method is installed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTable {
    Type,
    Number,
    Sequence,
}

/// A special method bound to a struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub method: &'static str,
    pub table: SlotTable,
    pub field: &'static str,
    pub func: &'static str,
}

impl Slot {
    const fn new(
        method: &'static str,
        table: SlotTable,
        field: &'static str,
        func: &'static str,
    ) -> Self {
        Self {
            method,
            table,
            field,
            func,
        }
    }

    pub fn function_type(&self) -> Option<&'static FunctionType> {
        function_type(self.func)
    }
}

pub const SLOTS: &[Slot] = &[
    Slot::new("__init__", Type, "tp_init", "initproc"),
    Slot::new("__str__", Type, "tp_str", "reprfunc"),
    Slot::new("__repr__", Type, "tp_repr", "reprfunc"),
    Slot::new("__hash__", Type, "tp_hash", "hashfunc"),
    Slot::new("__call__", Type, "tp_call", "ternaryfunc"),
    Slot::new("__iter__", Type, "tp_iter", "getiterfunc"),
    Slot::new("__next__", Type, "tp_iternext", "iternextfunc"),
    Slot::new("__len__", Sequence, "sq_length", "lenfunc"),
    Slot::new("__getitem__", Sequence, "sq_item", "ssizeargfunc"),
    Slot::new("__setitem__", Sequence, "sq_ass_item", "ssizeobjargproc"),
    Slot::new("__contains__", Sequence, "sq_contains", "objobjproc"),
    Slot::new("__add__", Number, "nb_add", "binaryfunc"),
    Slot::new("__sub__", Number, "nb_subtract", "binaryfunc"),
    Slot::new("__mul__", Number, "nb_multiply", "binaryfunc"),
    Slot::new("__mod__", Number, "nb_remainder", "binaryfunc"),
    Slot::new("__divmod__", Number, "nb_divmod", "binaryfunc"),
    Slot::new("__pow__", Number, "nb_power", "ternaryfunc"),
    Slot::new("__neg__", Number, "nb_negative", "unaryfunc"),
    Slot::new("__pos__", Number, "nb_positive", "unaryfunc"),
    Slot::new("__abs__", Number, "nb_absolute", "unaryfunc"),
    Slot::new("__bool__", Number, "nb_bool", "inquiry"),
    Slot::new("__invert__", Number, "nb_invert", "unaryfunc"),
    Slot::new("__lshift__", Number, "nb_lshift", "binaryfunc"),
    Slot::new("__rshift__", Number, "nb_rshift", "binaryfunc"),
    Slot::new("__and__", Number, "nb_and", "binaryfunc"),
    Slot::new("__xor__", Number, "nb_xor", "binaryfunc"),
    Slot::new("__or__", Number, "nb_or", "binaryfunc"),
    Slot::new("__int__", Number, "nb_int", "unaryfunc"),
    Slot::new("__float__", Number, "nb_float", "unaryfunc"),
    Slot::new("__iadd__", Number, "nb_inplace_add", "binaryfunc"),
    Slot::new("__isub__", Number, "nb_inplace_subtract", "binaryfunc"),
    Slot::new("__imul__", Number, "nb_inplace_multiply", "binaryfunc"),
    Slot::new("__imod__", Number, "nb_inplace_remainder", "binaryfunc"),
    Slot::new("__ipow__", Number, "nb_inplace_power", "ternaryfunc"),
    Slot::new("__ilshift__", Number, "nb_inplace_lshift", "binaryfunc"),
    Slot::new("__irshift__", Number, "nb_inplace_rshift", "binaryfunc"),
    Slot::new("__iand__", Number, "nb_inplace_and", "binaryfunc"),
    Slot::new("__ixor__", Number, "nb_inplace_xor", "binaryfunc"),
    Slot::new("__ior__", Number, "nb_inplace_or", "binaryfunc"),
    Slot::new("__floordiv__", Number, "nb_floor_divide", "binaryfunc"),
    Slot::new("__truediv__", Number, "nb_true_divide", "binaryfunc"),
    Slot::new("__ifloordiv__", Number, "nb_inplace_floor_divide", "binaryfunc"),
    Slot::new("__itruediv__", Number, "nb_inplace_true_divide", "binaryfunc"),
    Slot::new("__index__", Number, "nb_index", "unaryfunc"),
    Slot::new("__matmul__", Number, "nb_matrix_multiply", "binaryfunc"),
    Slot::new("__imatmul__", Number, "nb_inplace_matrix_multiply", "binaryfunc"),
];

/// Find the slot a special method is installed in.
pub fn slot(method: &str) -> Option<&'static Slot> {
    SLOTS.iter().find(|s| s.method == method)
}

/// Rich comparison methods and the op each one handles.
pub const RICH_COMPARE: &[(&str, &str)] = &[
    ("__lt__", "Py_LT"),
    ("__le__", "Py_LE"),
    ("__eq__", "Py_EQ"),
    ("__ne__", "Py_NE"),
    ("__gt__", "Py_GT"),
    ("__ge__", "Py_GE"),
];

pub fn compare_op(method: &str) -> Option<&'static str> {
    RICH_COMPARE
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, op)| *op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lookup() {
        let slot = slot("__add__").unwrap();
        assert_eq!(slot.table, SlotTable::Number);
        assert!(PY_NUMBER_METHODS.iter().any(|f| f.name == slot.field));
        assert!(super::slot("spawn").is_none());
    }

    #[test]
    fn test_every_slot_has_a_field_and_type() {
        for slot in SLOTS {
            let schema = match slot.table {
                SlotTable::Type => PY_TYPE_OBJECT,
                SlotTable::Number => PY_NUMBER_METHODS,
                SlotTable::Sequence => PY_SEQUENCE_METHODS,
            };
            let field = schema.iter().find(|f| f.name == slot.field);
            assert_eq!(field.map(|f| f.ty), Some(slot.func), "{}", slot.method);
            assert!(slot.function_type().is_some(), "{}", slot.method);
        }
    }

    #[test]
    fn test_signature() {
        let binary = function_type("binaryfunc").unwrap();
        assert_eq!(
            binary.signature("quill_method_X___add__", "X_struct*"),
            "PyObject* quill_method_X___add__(X_struct* self, PyObject* arg1)"
        );
        let getter = function_type("getter").unwrap();
        assert_eq!(
            getter.signature("g", "X_struct*"),
            "PyObject* g(X_struct* self, void*)"
        );
    }

    #[test]
    fn test_compare_op() {
        assert_eq!(compare_op("__eq__"), Some("Py_EQ"));
        assert_eq!(compare_op("__add__"), None);
    }
}
