use std::collections::HashSet;

use tpl_core::{DataContext, FillOptions, TemplateError};
use tpl_xml::{NodeId, Tree};

use crate::loop_block::{find_next_block, isolate_markers};

mod expand;
mod substitute;


/// Fills a scope of a parsed tree: all loop blocks first, then one
/// placeholder pass over whatever the loops did not produce.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    options: FillOptions,
}

impl TemplateEngine {
    pub fn new(options: FillOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    pub fn fill_scope(
        &self,
        tree: &mut Tree,
        scope: NodeId,
        context: &DataContext<'_>,
    ) -> Result<(), TemplateError> {
        self.fill_scope_at_depth(tree, scope, context, 0)
    }

    fn fill_scope_at_depth(
        &self,
        tree: &mut Tree,
        scope: NodeId,
        context: &DataContext<'_>,
        depth: usize,
    ) -> Result<(), TemplateError> {
        if depth > self.options.max_depth {
            return Err(TemplateError::internal(
                "TEMPLATE_DEPTH_EXCEEDED",
                format!(
                    "Loop nesting exceeds the configured maximum of {}.",
                    self.options.max_depth
                ),
            ));
        }

        // Nodes produced by finished iterations; never rescanned in this scope.
        let mut settled = HashSet::new();
        isolate_markers(tree, scope, &settled)?;

        while let Some(block) = find_next_block(tree, scope, &settled)? {
            self.expand_block(tree, &block, context, &mut settled, depth)?;
        }

        substitute::substitute_scope(tree, scope, context, &settled, self.options.missing_value)
    }
}
