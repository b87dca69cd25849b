//! Render phase - produces the interface and implementation buffers.

use crate::{
    Error, ModuleRenderer, RenderOptions, Result,
    pipeline::{CompilationContext, Phase},
};

/// Phase that renders the finalized entity graph into [`Artifacts`](crate::Artifacts).
pub struct RenderPhase;

impl Phase for RenderPhase {
    fn name(&self) -> &'static str {
        "render"
    }

    fn description(&self) -> &'static str {
        "Render the C++ interface and implementation files"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let graph = ctx.require_graph(self.name())?;
        if !graph.is_finalized() {
            return Err(Box::new(Error::PhaseOrder {
                phase: self.name(),
                needs: "finalize",
            }));
        }

        let options = RenderOptions::from_config(&ctx.output_name, &ctx.manifest.generator);
        let artifacts = ModuleRenderer::new(graph, &options).render()?;
        ctx.artifacts = Some(artifacts);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use quill_manifest::Manifest;

    use super::*;
    use crate::pipeline::phases::ParsePhase;

    #[test]
    fn test_requires_finalize() {
        let manifest = Manifest::from_str("[module]\nname = \"m\"").unwrap();
        let mut ctx = CompilationContext::new(manifest);
        ParsePhase.run(&mut ctx).unwrap();

        let err = RenderPhase.run(&mut ctx).unwrap_err();
        assert!(matches!(
            *err,
            Error::PhaseOrder {
                phase: "render",
                needs: "finalize"
            }
        ));
        assert!(ctx.artifacts.is_none());
    }
}
