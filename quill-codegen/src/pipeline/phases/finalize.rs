//! Finalize phase - resolves bases, inherits members, marks inclusion.

use crate::{
    FinalizeOptions, Result,
    pipeline::{CompilationContext, Phase},
};

/// Phase that finalizes the entity graph built by [`ParsePhase`](super::ParsePhase).
pub struct FinalizePhase;

impl Phase for FinalizePhase {
    fn name(&self) -> &'static str {
        "finalize"
    }

    fn description(&self) -> &'static str {
        "Resolve base classes, inherit members and decide what is exported"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let options = FinalizeOptions {
            inherit_members: ctx.manifest.generator.inherit_members,
        };
        let diagnostics = ctx.require_graph_mut(self.name())?.finalize(&options)?;
        ctx.diagnostics.extend(diagnostics);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use quill_manifest::Manifest;

    use super::*;
    use crate::{Error, pipeline::phases::ParsePhase};

    #[test]
    fn test_requires_parse() {
        let manifest = Manifest::from_str("[module]\nname = \"m\"").unwrap();
        let mut ctx = CompilationContext::new(manifest);
        let err = FinalizePhase.run(&mut ctx).unwrap_err();
        assert!(matches!(*err, Error::PhaseOrder { needs: "parse", .. }));
    }

    #[test]
    fn test_honours_inherit_members() {
        let manifest = Manifest::from_str(
            r#"
            [module]
            name = "m"

            [generator]
            inherit_members = false

            [[classes]]
            name = "Base"
            doc = "_CPP_: int x;"

            [[classes.methods]]
            name = "get"
            params = 1
            doc = "_CPP_: return toPython(self->x);"

            [[classes]]
            name = "Derived"
            bases = ["Base"]
        "#,
        )
        .unwrap();
        let mut ctx = CompilationContext::new(manifest);
        ParsePhase.run(&mut ctx).unwrap();
        FinalizePhase.run(&mut ctx).unwrap();

        let graph = ctx.require_graph("test").unwrap();
        assert!(graph.is_finalized());
        let derived = graph.class(graph.class_id("Derived").unwrap());
        assert!(derived.included);
        assert!(derived.methods.is_empty());
    }
}
