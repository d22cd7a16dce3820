//! Structured control flow → basic blocks
//!
//! Every construct appends all of its blocks before lowering any nested
//! statement, so nested constructs' blocks follow the enclosing ones in the
//! function. The cursor is always left at the construct's exit block.

use crate::CodegenError;
use crate::generate::Generator;
use oat_llir::BlockId;
use oat_syntax::NodeId;

impl Generator<'_> {
    /// `[comparison, then, else?]`
    pub(crate) fn if_statement(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let cond_node = self.ast.child(id, 0, "condition")?;
        let then_node = self.ast.child(id, 1, "then branch")?;
        let else_node = self.ast.children(id).get(2).copied();

        let cond = self.condition(cond_node)?;
        let builder = &mut self.ctx.builder;
        let then_block = builder.append_block_here("if_block")?;
        let else_block = match else_node {
            Some(_) => Some(builder.append_block_here("else_block")?),
            None => None,
        };
        let merge_block = builder.append_block_here("merge_block")?;
        builder.cond_br(cond, then_block, else_block.unwrap_or(merge_block))?;

        self.branch(then_block, then_node, merge_block)?;
        if let (Some(block), Some(node)) = (else_block, else_node) {
            self.branch(block, node, merge_block)?;
        }
        self.ctx.builder.switch_to(merge_block)?;
        Ok(())
    }

    /// Lower `body` into `block`, then fall through to `next`
    fn branch(&mut self, block: BlockId, body: NodeId, next: BlockId) -> Result<(), CodegenError> {
        self.ctx.builder.switch_to(block)?;
        self.generate(body)?;
        // a `return` in the body already closed the block
        if !self.ctx.builder.is_terminated() {
            self.ctx.builder.br(next)?;
        }
        Ok(())
    }

    /// `[init, comparison, update, body]`; the body runs before the update
    pub(crate) fn for_loop(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let init = self.ast.child(id, 0, "loop initializer")?;
        let cond_node = self.ast.child(id, 1, "loop condition")?;
        let update = self.ast.child(id, 2, "loop update")?;
        let body = self.ast.child(id, 3, "loop body")?;

        let builder = &mut self.ctx.builder;
        let cond_block = builder.append_block_here("for_loop_cond")?;
        let body_block = builder.append_block_here("for_loop_body")?;
        let end_block = builder.append_block_here("for_loop_end")?;

        self.generate(init)?;
        self.ctx.builder.br(cond_block)?;

        self.ctx.builder.switch_to(cond_block)?;
        let cond = self.condition(cond_node)?;
        self.ctx.builder.cond_br(cond, body_block, end_block)?;

        self.ctx.builder.switch_to(body_block)?;
        self.generate(body)?;
        self.branch_if_open(cond_block, update)?;

        self.ctx.builder.switch_to(end_block)?;
        Ok(())
    }

    /// `[comparison, body]`
    pub(crate) fn while_loop(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let cond_node = self.ast.child(id, 0, "loop condition")?;
        let body = self.ast.child(id, 1, "loop body")?;

        let builder = &mut self.ctx.builder;
        let cond_block = builder.append_block_here("while_loop_cond")?;
        let body_block = builder.append_block_here("while_loop_body")?;
        let end_block = builder.append_block_here("while_loop_end")?;
        builder.br(cond_block)?;

        builder.switch_to(cond_block)?;
        let cond = self.condition(cond_node)?;
        self.ctx.builder.cond_br(cond, body_block, end_block)?;

        self.branch(body_block, body, cond_block)?;
        self.ctx.builder.switch_to(end_block)?;
        Ok(())
    }

    /// Lower `update` and jump back to `target`, unless the body returned
    fn branch_if_open(&mut self, target: BlockId, update: NodeId) -> Result<(), CodegenError> {
        if self.ctx.builder.is_terminated() {
            return Ok(());
        }
        self.generate(update)?;
        self.ctx.builder.br(target)?;
        Ok(())
    }
}
