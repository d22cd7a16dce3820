//! External runtime declarations

use crate::context::{Binding, GenContext};
use oat_llir::Type;
use oat_syntax::{AbiType, RUNTIME_FUNCTIONS};
use tracing::debug;

/// IR spelling of a runtime ABI type
#[must_use]
pub fn abi_type(ty: AbiType) -> Type {
    match ty {
        AbiType::Void => Type::Void,
        AbiType::I32 => Type::i32(),
        AbiType::CharPtr | AbiType::IntPtr => Type::Ptr,
    }
}

/// Declare every runtime function in the module and bind it in the code map
///
/// Must run before any user code is lowered, so calls can find their callee.
pub fn declare_runtime_functions(ctx: &mut GenContext) {
    for function in &RUNTIME_FUNCTIONS {
        let params = function.params.iter().copied().map(abi_type).collect();
        let callee = ctx
            .builder
            .declare_function(function.name, abi_type(function.ret), params);
        debug!(name = function.name, "declare runtime function");
        ctx.bind(function.unique_name(), Binding::Function(callee));
    }
}
