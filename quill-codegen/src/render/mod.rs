//! CPython C-API module rendering.
//!
//! [`ModuleRenderer`] walks a finalized [`EntityGraph`] and produces the
//! interface (`.h`) and implementation (`.cpp`) buffers of one extension
//! module. Every fragment goes through the [`TagResolver`] on its way out.

mod class;
mod member;

use std::path::{Path, PathBuf};

use quill_core::{FileRules, GeneratedFile, WriteResult, to_c_string};
use quill_manifest::GeneratorConfig;
use serde::Serialize;

pub use self::member::{CallConvention, MethodKind};
use self::class::ClassRenderer;
use crate::{
    CodeBuilder, EntityGraph, IndentNormalizer, Result,
    abi::PY_MODULE_DEF,
    annotation::{Fragment, FragmentKey},
    entity::{ClassId, Function, SourcePosition},
    naming::Naming,
    table::StructTable,
    tags::{FragmentSite, TagResolver},
    template::TemplateSubstitutor,
};

/// Comment placed at the top of every generated file.
pub const GENERATED_HEADER: &str = "/* Generated by quill. Do not edit. */";

/// Settings for one render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Base name of the output files
    pub name: String,
    /// Prefix of every generated C symbol
    pub prefix: String,
    pub indent_width: usize,
    pub tab_width: usize,
    /// Header included at the top of the interface
    pub python_header: String,
}

impl RenderOptions {
    pub fn from_config(name: impl Into<String>, config: &GeneratorConfig) -> Self {
        Self {
            name: name.into(),
            prefix: config.prefix.clone(),
            indent_width: usize::from(config.indent_width),
            tab_width: usize::from(config.tab_width),
            python_header: config.python_header.clone(),
        }
    }
}

/// The two generated buffers.
#[derive(Debug, Clone, Serialize)]
pub struct Artifacts {
    /// Base name of the output files
    pub name: String,
    pub interface: String,
    pub implementation: String,
}

impl Artifacts {
    pub fn interface_file(&self) -> ArtifactFile<'_> {
        ArtifactFile {
            file_name: format!("{}.h", self.name),
            content: &self.interface,
        }
    }

    pub fn implementation_file(&self) -> ArtifactFile<'_> {
        ArtifactFile {
            file_name: format!("{}.cpp", self.name),
            content: &self.implementation,
        }
    }

    pub fn files(&self) -> [ArtifactFile<'_>; 2] {
        [self.interface_file(), self.implementation_file()]
    }

    /// Write both files into `dir`.
    pub fn write_all(&self, dir: &Path) -> eyre::Result<Vec<(PathBuf, WriteResult)>> {
        let mut written = Vec::with_capacity(2);
        for file in self.files() {
            let result = file.write(dir)?;
            let path = file.path(dir);
            tracing::info!(path = %path.display(), ?result, "artifact written");
            written.push((path, result));
        }
        Ok(written)
    }
}

/// One artifact as a [`GeneratedFile`].
#[derive(Debug, Clone)]
pub struct ArtifactFile<'a> {
    file_name: String,
    content: &'a str,
}

impl ArtifactFile<'_> {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl GeneratedFile for ArtifactFile<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(&self.file_name)
    }

    fn rules(&self) -> FileRules {
        FileRules::with_header(GENERATED_HEADER)
    }

    fn render(&self) -> String {
        self.content.to_string()
    }
}

/// Renders a finalized entity graph into [`Artifacts`].
pub struct ModuleRenderer<'g> {
    graph: &'g EntityGraph,
    options: &'g RenderOptions,
    naming: Naming<'g>,
    resolver: TagResolver<'g>,
    normalizer: IndentNormalizer,
    substitutor: TemplateSubstitutor,
}

impl<'g> ModuleRenderer<'g> {
    pub fn new(graph: &'g EntityGraph, options: &'g RenderOptions) -> Self {
        let normalizer = IndentNormalizer::new(options.tab_width);
        Self {
            graph,
            options,
            naming: Naming::new(&options.prefix),
            resolver: TagResolver::new(graph, &options.prefix).with_normalizer(normalizer),
            normalizer,
            substitutor: TemplateSubstitutor::new(normalizer),
        }
    }

    pub fn render(&self) -> Result<Artifacts> {
        tracing::debug!(
            module = %self.graph.module().name,
            classes = self.graph.included_classes().count(),
            functions = self.graph.included_functions().count(),
            "rendering module"
        );
        Ok(Artifacts {
            name: self.options.name.clone(),
            interface: self.render_interface()?,
            implementation: self.render_implementation()?,
        })
    }

    fn render_interface(&self) -> Result<String> {
        let module = &self.graph.module().name;
        let guard = include_guard(&self.options.name);
        let mut b = self.builder();

        b.push_line(&format!("#ifndef {guard}"));
        b.push_line(&format!("#define {guard}"));
        b.push_blank();
        b.push_line(&format!("#include <{}>", self.options.python_header));
        b.push_blank();

        if let Some(header) = self.graph.module().fragment(FragmentKey::Header) {
            self.push_module_fragment(&mut b, header)?;
            b.push_blank();
        }

        b.push_line("extern \"C\" {");
        {
            let mut b = b.indented();
            b.push_line(&format!("bool {}();", self.naming.initialize_module(module)));
        }
        b.push_line("} // extern \"C\"");
        b.push_blank();
        b.push_line(&format!("#endif // {guard}"));

        Ok(b.build())
    }

    fn render_implementation(&self) -> Result<String> {
        let classes: Vec<ClassRenderer<'_, 'g>> = self
            .graph
            .included_classes()
            .map(|(id, _)| ClassRenderer::new(self, id))
            .collect();

        let mut b = self.builder();
        b.push_line(&format!("#include \"{}.h\"", self.options.name));
        b.push_blank();

        if let Some(preamble) = self.graph.module().fragment(FragmentKey::Default) {
            self.push_module_fragment(&mut b, preamble)?;
            b.push_blank();
        }

        b.push_line("extern \"C\" {");
        b.push_blank();
        b.push_indent();

        for class in &classes {
            class.push_forward_declarations(&mut b);
        }
        for class in &classes {
            class.push_struct(&mut b)?;
        }

        self.push_module_doc(&mut b);
        for function in self.graph.included_functions() {
            self.push_function(&mut b, function)?;
        }
        for class in &classes {
            class.push_bodies(&mut b)?;
        }

        for class in &classes {
            class.push_tables(&mut b)?;
        }
        self.push_module_tables(&mut b);

        b.push_dedent()?;
        b.push_line("} // extern \"C\"");
        b.push_blank();

        for class in &classes {
            class.push_registration(&mut b);
        }
        self.push_module_registration(&mut b, &classes);

        Ok(b.build())
    }

    fn builder(&self) -> CodeBuilder {
        CodeBuilder::new(self.options.indent_width).with_normalizer(self.normalizer)
    }

    fn push_module_fragment(&self, b: &mut CodeBuilder, fragment: &Fragment) -> Result<()> {
        let module = self.graph.module();
        let site = FragmentSite {
            entity: &module.name,
            key: fragment.key,
            position: &module.position,
            doc: &module.doc,
            offset: fragment.offset,
            class: None,
        };
        let text = self.resolver.resolve(&fragment.body, &site, b.columns())?;
        push_lines(b, &text);
        Ok(())
    }

    fn push_module_doc(&self, b: &mut CodeBuilder) {
        let module = self.graph.module();
        let symbol = self.naming.module_doc(&module.name);
        push_doc(b, &symbol, &module.description);
    }

    fn push_function(&self, b: &mut CodeBuilder, function: &Function) -> Result<()> {
        let symbol = self.naming.function(&function.name);
        let convention = CallConvention::from_signature(&function.signature, false);

        push_position(b, &function.position);
        push_doc(b, &doc_symbol(&symbol), &function.description);
        let header = convention.signature(&symbol, "PyObject*");
        self.push_body(b, &header, function, None)?;
        b.push_blank();
        Ok(())
    }

    /// Emit `header` with the resolved default fragment of `function` as body.
    fn push_body(
        &self,
        b: &mut CodeBuilder,
        header: &str,
        function: &Function,
        class: Option<ClassId>,
    ) -> Result<()> {
        let Some(fragment) = function.body() else {
            return Ok(());
        };
        let site = FragmentSite {
            entity: &function.qualified_name,
            key: fragment.key,
            position: &function.position,
            doc: &function.doc,
            offset: fragment.offset,
            class,
        };
        self.push_block(b, header, &fragment.body, &site)
    }

    fn push_block(
        &self,
        b: &mut CodeBuilder,
        header: &str,
        body: &str,
        site: &FragmentSite<'_>,
    ) -> Result<()> {
        b.block(header, "}", |b| {
            let text = self.resolver.resolve(body, site, b.columns())?;
            push_lines(b, &text);
            Ok(())
        })?;
        Ok(())
    }

    fn push_module_tables(&self, b: &mut CodeBuilder) {
        let module = &self.graph.module().name;
        let methods = self.naming.module_methods(module);

        let entries: Vec<MethodEntry> = self
            .graph
            .included_functions()
            .map(|function| {
                let symbol = self.naming.function(&function.name);
                MethodEntry {
                    name: function.name.clone(),
                    flags: CallConvention::from_signature(&function.signature, false).flags(),
                    doc: (!function.description.is_empty()).then(|| doc_symbol(&symbol)),
                    function: symbol,
                }
            })
            .collect();
        push_method_table(b, &methods, &entries);

        let def = self.naming.module_def(module);
        let doc = if self.graph.module().description.is_empty() {
            "NULL".to_string()
        } else {
            self.naming.module_doc(module)
        };
        let table = StructTable::new("PyModuleDef", &def, PY_MODULE_DEF)
            .head("PyModuleDef_HEAD_INIT,")
            .set("m_name", format!("\"{module}\""))
            .set("m_doc", doc)
            .set("m_size", "-1")
            .set("m_methods", methods.as_str());
        b.push_text(&table.render());
        b.push_blank();
    }

    fn push_module_registration(&self, b: &mut CodeBuilder, classes: &[ClassRenderer<'_, 'g>]) {
        let module = &self.graph.module().name;
        let create = self.naming.create_module(module);
        let class_init = classes
            .iter()
            .map(|class| {
                self.substitutor.substitute(
                    CLASS_INIT_CALL,
                    &[("init_fn", class.symbols().initialize_fn().as_str())],
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let create_text = self.substitutor.substitute(
            CREATE_MODULE,
            &[
                ("create_fn", create.as_str()),
                ("module_def", self.naming.module_def(module).as_str()),
                ("classes", class_init.as_str()),
            ],
        );
        b.push_text(&create_text);
        b.push_blank();

        let init_text = self.substitutor.substitute(
            INITIALIZE_MODULE,
            &[
                ("init_fn", self.naming.initialize_module(module).as_str()),
                ("module", module.as_str()),
                ("create_fn", create.as_str()),
            ],
        );
        b.push_text(&init_text);
    }

    pub(crate) fn graph(&self) -> &'g EntityGraph {
        self.graph
    }

    pub(crate) fn naming(&self) -> Naming<'g> {
        self.naming
    }

    pub(crate) fn resolver(&self) -> &TagResolver<'g> {
        &self.resolver
    }

    pub(crate) fn substitutor(&self) -> &TemplateSubstitutor {
        &self.substitutor
    }
}

const CLASS_INIT_CALL: &str = "\
if (!%(init_fn)s(module))
{
    Py_DECREF(module);
    return NULL;
}";

const CREATE_MODULE: &str = "\
PyObject* %(create_fn)s()
{
    PyObject* module = PyModule_Create(&%(module_def)s);
    if (module == NULL)
        return NULL;
    %(classes)s
    return module;
}";

const INITIALIZE_MODULE: &str = "\
bool %(init_fn)s()
{
    return 0 == PyImport_AppendInittab(\"%(module)s\", &%(create_fn)s);
}";

/// One row of a `PyMethodDef` table.
#[derive(Debug, Clone)]
pub(crate) struct MethodEntry {
    pub name: String,
    pub function: String,
    pub flags: &'static str,
    pub doc: Option<String>,
}

pub(crate) fn push_method_table(b: &mut CodeBuilder, symbol: &str, entries: &[MethodEntry]) {
    b.push_line(&format!("static PyMethodDef {symbol}[] ="));
    b.push_line("{");
    {
        let mut b = b.indented();
        for entry in entries {
            b.push_line(&format!(
                "{{ \"{}\", reinterpret_cast<PyCFunction>({}), {}, {} }},",
                entry.name,
                entry.function,
                entry.flags,
                entry.doc.as_deref().unwrap_or("NULL"),
            ));
        }
        b.push_line("{ NULL, NULL, 0, NULL }");
    }
    b.push_line(&format!("}}; /* {symbol} */"));
    b.push_blank();
}

/// Push already indented lines.
pub(crate) fn push_lines(b: &mut CodeBuilder, text: &str) {
    if text.is_empty() {
        return;
    }
    b.push_raw(text);
    b.push_raw("\n");
}

pub(crate) fn push_position(b: &mut CodeBuilder, position: &SourcePosition) {
    b.push_line(&format!("/* {position} */"));
}

/// Emit a doc-string constant when there is a description.
pub(crate) fn push_doc(b: &mut CodeBuilder, symbol: &str, description: &str) {
    if description.is_empty() {
        return;
    }
    b.push_line(&format!(
        "static const char {}[] = \"{}\";",
        symbol,
        to_c_string(&clean_description(description))
    ));
}

pub(crate) fn doc_symbol(function: &str) -> String {
    format!("{function}_doc")
}

/// Strip the common indentation of every line after the first.
fn clean_description(description: &str) -> String {
    match description.split_once('\n') {
        Some((first, rest)) => {
            let rest = crate::reindent(rest, 0);
            format!("{}\n{}", first.trim(), rest.trim_end())
        }
        None => description.trim().to_string(),
    }
}

fn include_guard(name: &str) -> String {
    let mut guard: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    guard.insert_str(0, "QUILL_");
    guard.push_str("_H");
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard("example"), "QUILL_EXAMPLE_H");
        assert_eq!(include_guard("my-mod.v2"), "QUILL_MY_MOD_V2_H");
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(
            clean_description("func_add(float, float) -> float\n    Adds two numbers"),
            "func_add(float, float) -> float\nAdds two numbers"
        );
        assert_eq!(clean_description("  one line "), "one line");
    }

    #[test]
    fn test_method_table() {
        let mut b = CodeBuilder::new(4);
        push_method_table(
            &mut b,
            "t",
            &[MethodEntry {
                name: "get".to_string(),
                function: "p_method_X_get".to_string(),
                flags: "METH_NOARGS",
                doc: None,
            }],
        );
        assert_eq!(
            b.build(),
            "static PyMethodDef t[] =\n{\n    { \"get\", reinterpret_cast<PyCFunction>(p_method_X_get), METH_NOARGS, NULL },\n    { NULL, NULL, 0, NULL }\n}; /* t */\n\n"
        );
    }

    #[test]
    fn test_artifact_files() {
        let artifacts = Artifacts {
            name: "example".to_string(),
            interface: "h".to_string(),
            implementation: "cpp".to_string(),
        };
        let [interface, implementation] = artifacts.files();
        assert_eq!(interface.file_name(), "example.h");
        assert_eq!(
            implementation.path(Path::new("out")),
            Path::new("out").join("example.cpp")
        );
        assert_eq!(interface.render(), "h");
    }

    #[test]
    fn test_write_all() {
        let dir = tempfile::TempDir::new().unwrap();
        let artifacts = Artifacts {
            name: "m".to_string(),
            interface: "int x;\n".to_string(),
            implementation: "int y;\n".to_string(),
        };
        let written = artifacts.write_all(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        let header = std::fs::read_to_string(dir.path().join("m.h")).unwrap();
        assert_eq!(header, format!("{GENERATED_HEADER}\nint x;\n"));

        let again = artifacts.write_all(dir.path()).unwrap();
        assert!(again.iter().all(|(_, result)| *result == WriteResult::Unchanged));
    }
}
