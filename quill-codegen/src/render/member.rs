//! Calling conventions and signatures of generated functions.

use crate::{
    abi::{self, Slot},
    entity::{Function, Signature},
};

/// `PyMethodDef` calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallConvention {
    NoArgs,
    Object,
    VarArgs,
    Keywords,
}

impl CallConvention {
    /// Derive the convention from a discovered signature.
    ///
    /// `receiver` is whether the first positional parameter is `self`.
    pub fn from_signature(signature: &Signature, receiver: bool) -> Self {
        if signature.varargs || signature.kwargs {
            return Self::Keywords;
        }
        let params = if receiver {
            signature.params.saturating_sub(1)
        } else {
            signature.params
        };
        match params {
            0 => Self::NoArgs,
            1 => Self::Object,
            _ => Self::VarArgs,
        }
    }

    pub fn flags(&self) -> &'static str {
        match self {
            Self::NoArgs => "METH_NOARGS",
            Self::Object => "METH_O",
            Self::VarArgs => "METH_VARARGS",
            Self::Keywords => "METH_VARARGS | METH_KEYWORDS",
        }
    }

    /// Definition header for `symbol` taking `self` as `receiver`.
    pub fn signature(&self, symbol: &str, receiver: &str) -> String {
        let params = match self {
            Self::NoArgs => "PyObject*",
            Self::Object | Self::VarArgs => "PyObject* arg1",
            Self::Keywords => "PyObject* arg1, PyObject* arg2",
        };
        format!("PyObject* {symbol}({receiver} self, {params})")
    }
}

/// How a class method is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Entry in the `PyMethodDef` table
    Plain(CallConvention),
    /// Installed in a type, number or sequence slot
    Slot(&'static Slot),
    /// Handled by the rich-compare dispatcher for this op
    Compare(&'static str),
}

impl MethodKind {
    pub fn of(method: &Function) -> Self {
        if let Some(op) = abi::compare_op(&method.name) {
            return Self::Compare(op);
        }
        if let Some(slot) = abi::slot(&method.name) {
            return Self::Slot(slot);
        }
        Self::Plain(CallConvention::from_signature(&method.signature, true))
    }

    /// Definition header of the method's generated function.
    pub fn signature(&self, symbol: &str, receiver: &str) -> String {
        match self {
            Self::Plain(convention) => convention.signature(symbol, receiver),
            Self::Slot(slot) => match slot.function_type() {
                Some(ty) => ty.signature(symbol, receiver),
                None => format!("PyObject* {symbol}({receiver} self)"),
            },
            Self::Compare(_) => {
                format!("PyObject* {symbol}({receiver} self, PyObject* arg1, int arg2)")
            }
        }
    }
}
