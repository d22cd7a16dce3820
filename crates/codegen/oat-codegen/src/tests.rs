use crate::{CodegenError, generate};
use oat_llir::{Instruction, IntPredicate, LlirError, Module, Terminator, Type, Value};
use oat_syntax::{Ast, AstBuilder, NodeId, NodeKind, ValueType};

/// Small tree-building vocabulary for the tests below
struct Tree(AstBuilder);

impl Tree {
    fn new() -> Self {
        Self(AstBuilder::new())
    }

    fn id(&mut self, name: &str) -> NodeId {
        self.0.leaf(NodeKind::Id, name)
    }

    fn int(&mut self, value: &str) -> NodeId {
        self.0.leaf(NodeKind::IntLiteral, value)
    }

    fn string(&mut self, text: &str) -> NodeId {
        self.0.leaf(NodeKind::StringLiteral, text)
    }

    fn node(&mut self, kind: NodeKind, children: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.0.node(kind, "", children)
    }

    fn global(&mut self, name: &str, init: NodeId) -> NodeId {
        let id = self.id(name);
        self.node(NodeKind::GlobalDecl, [id, init])
    }

    fn local(&mut self, name: &str, init: NodeId) -> NodeId {
        let id = self.id(name);
        self.node(NodeKind::VarDecl, [id, init])
    }

    fn binary(&mut self, kind: NodeKind, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.node(kind, [lhs, rhs])
    }

    fn var(&mut self, name: &str) -> NodeId {
        self.id(name)
    }

    fn assign(&mut self, name: &str, value: NodeId) -> NodeId {
        let id = self.id(name);
        self.node(NodeKind::Assign, [id, value])
    }

    fn call(&mut self, callee: &str, args: impl IntoIterator<Item = NodeId>) -> NodeId {
        let callee = self.id(callee);
        let exps = self.node(NodeKind::Exps, args);
        self.node(NodeKind::FuncCall, [callee, exps])
    }

    fn ret(&mut self, value: Option<NodeId>) -> NodeId {
        self.node(NodeKind::Return, value)
    }

    fn stmts(&mut self, stmts: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.node(NodeKind::Stmts, stmts)
    }

    fn function(&mut self, ret: NodeKind, name: &str, body: NodeId) -> NodeId {
        let ret = self.0.leaf(ret, "");
        let name = self.id(name);
        let args = self.node(NodeKind::Args, []);
        self.node(NodeKind::FuncDecl, [ret, name, args, body])
    }

    fn program(mut self, items: impl IntoIterator<Item = NodeId>) -> Ast {
        let root = self.node(NodeKind::Program, items);
        self.0.finish(root)
    }
}

fn compile(mut ast: Ast) -> Result<Module, CodegenError> {
    oat_resolve::analyze(&mut ast).expect("test trees are well scoped");
    generate(&ast, "test")
}

fn block_names(module: &Module, function: &str) -> Vec<String> {
    let (_, function) = module.function_by_name(function).unwrap();
    function.blocks.iter().map(|b| b.name.clone()).collect()
}

/// `int main() { int a = 1; int b = 2; if (a < b) {...} [else {...}] return 0; }`
fn main_with_if(with_else: bool) -> Ast {
    let mut t = Tree::new();
    let one = t.int("1");
    let a = t.local("a", one);
    let two = t.int("2");
    let b = t.local("b", two);
    let lhs = t.var("a");
    let rhs = t.var("b");
    let cond = t.binary(NodeKind::Less, lhs, rhs);
    let arg = t.var("a");
    let print_a = t.call("print_int", [arg]);
    let then = t.stmts([print_a]);
    let mut children = vec![cond, then];
    if with_else {
        let arg = t.var("b");
        let print_b = t.call("print_int", [arg]);
        let body = t.stmts([print_b]);
        children.push(t.node(NodeKind::Else, [body]));
    }
    let branch = t.node(NodeKind::If, children);
    let zero = t.int("0");
    let ret = t.ret(Some(zero));
    let body = t.stmts([a, b, branch, ret]);
    let main = t.function(NodeKind::TInt, "main", body);
    t.program([main])
}

#[test]
fn lone_global_int_emits_one_constant_and_no_definitions() {
    let mut t = Tree::new();
    let five = t.int("5");
    let x = t.global("x", five);
    let module = compile(t.program([x])).unwrap();

    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.globals[0].name, "x-1");
    assert_eq!(module.globals[0].init, Value::i32(5));
    assert_eq!(module.definitions().count(), 0);
    assert_eq!(module.declarations().count(), 8);
    assert!(module.to_string().contains("@x-1 = private constant i32 5\n"));
}

#[test]
fn repeated_global_is_rejected() {
    let mut t = Tree::new();
    let one = t.int("1");
    let first = t.global("x", one);
    let two = t.int("2");
    let second = t.global("x", two);
    let err = compile(t.program([first, second])).unwrap_err();

    assert_eq!(
        err,
        CodegenError::DuplicateGlobal {
            name: "x-1".to_owned(),
            node: 4,
        }
    );
}

#[test]
fn global_may_reuse_a_function_name() {
    let mut t = Tree::new();
    let body = t.stmts([]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let one = t.int("1");
    let shadow = t.global("main", one);
    let module = compile(t.program([main, shadow])).unwrap();

    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.globals[0].name, "main-1");
}

#[test]
fn string_global_is_sized_with_its_terminator() {
    let mut t = Tree::new();
    let text = t.string(r"hi\n");
    let s = t.global("s", text);
    let module = compile(t.program([s])).unwrap();

    assert_eq!(module.globals[0].ty, Type::bytes(4));
    assert!(
        module
            .to_string()
            .contains("@s-1 = private constant [4 x i8] c\"hi\\0A\\00\"")
    );
}

#[test]
fn global_initializer_must_be_literal() {
    let mut t = Tree::new();
    let five = t.int("5");
    let x = t.global("x", five);
    let init = t.var("x");
    let y = t.global("y", init);
    let err = compile(t.program([x, y])).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::NonConstantInitializer {
            kind: NodeKind::Id,
            ..
        }
    ));
}

#[test]
fn if_else_branches_both_reach_the_merge_block() {
    let module = compile(main_with_if(true)).unwrap();
    assert_eq!(
        block_names(&module, "main"),
        vec!["entry", "if_block", "else_block", "merge_block"]
    );

    let (_, main) = module.function_by_name("main").unwrap();
    let entry = &main.blocks[0];
    let Some(Terminator::CondBr {
        then_block,
        else_block,
        ..
    }) = &entry.terminator
    else {
        panic!("entry should end in a conditional branch");
    };
    assert_eq!(main.block(*then_block).name, "if_block");
    assert_eq!(main.block(*else_block).name, "else_block");

    let merge = main.block_by_name("merge_block").unwrap();
    for name in ["if_block", "else_block"] {
        let block = main.block(main.block_by_name(name).unwrap());
        assert_eq!(block.terminator, Some(Terminator::Br(merge)));
    }
    // code after the `if` lands in the merge block
    assert_eq!(
        main.block(merge).terminator,
        Some(Terminator::Ret(Value::i32(0)))
    );
}

#[test]
fn if_without_else_falls_through_to_merge() {
    let module = compile(main_with_if(false)).unwrap();
    assert_eq!(
        block_names(&module, "main"),
        vec!["entry", "if_block", "merge_block"]
    );
    let (_, main) = module.function_by_name("main").unwrap();
    let merge = main.block_by_name("merge_block").unwrap();
    let Some(Terminator::CondBr { else_block, .. }) = &main.blocks[0].terminator else {
        panic!("entry should end in a conditional branch");
    };
    assert_eq!(*else_block, merge);

    let cmp = main.blocks[0]
        .instructions
        .iter()
        .find_map(|inst| match inst {
            Instruction::ICmp { predicate, .. } => Some(*predicate),
            _ => None,
        });
    assert_eq!(cmp, Some(IntPredicate::Slt));
}

#[test]
fn for_loop_runs_body_then_update() {
    // void count() { for (int i = 0; i < 5; i = i + 1) { print_int(i); } }
    let mut t = Tree::new();
    let zero = t.int("0");
    let init = t.local("i", zero);
    let i = t.var("i");
    let five = t.int("5");
    let cond = t.binary(NodeKind::Less, i, five);
    let i = t.var("i");
    let one = t.int("1");
    let plus = t.binary(NodeKind::Plus, i, one);
    let update = t.assign("i", plus);
    let i = t.var("i");
    let print = t.call("print_int", [i]);
    let body = t.stmts([print]);
    let looped = t.node(NodeKind::For, [init, cond, update, body]);
    let stmts = t.stmts([looped]);
    let count = t.function(NodeKind::TVoid, "count", stmts);
    let module = compile(t.program([count])).unwrap();

    assert_eq!(
        block_names(&module, "count"),
        vec!["entry", "for_loop_cond", "for_loop_body", "for_loop_end"]
    );
    let (_, count) = module.function_by_name("count").unwrap();
    let cond = count.block_by_name("for_loop_cond").unwrap();
    let body = count.block(count.block_by_name("for_loop_body").unwrap());
    let end = count.block(count.block_by_name("for_loop_end").unwrap());

    // the init slot is allocated in entry, named by its unique name
    assert!(matches!(
        &count.blocks[0].instructions[0],
        Instruction::Alloca { result, .. } if result == "i-3"
    ));
    assert_eq!(count.blocks[0].terminator, Some(Terminator::Br(cond)));

    let kinds: Vec<&str> = body
        .instructions
        .iter()
        .map(|inst| match inst {
            Instruction::Load { .. } => "load",
            Instruction::Call { .. } => "call",
            Instruction::Add { .. } => "add",
            Instruction::Store { .. } => "store",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["load", "call", "load", "add", "add", "store"]);
    assert_eq!(body.terminator, Some(Terminator::Br(cond)));
    assert_eq!(end.terminator, Some(Terminator::RetVoid));
}

#[test]
fn while_loop_blocks() {
    // void spin() { int n = 3; while (n > 0) { n = n - 1; } }
    let mut t = Tree::new();
    let three = t.int("3");
    let n = t.local("n", three);
    let lhs = t.var("n");
    let zero = t.int("0");
    let cond = t.binary(NodeKind::Great, lhs, zero);
    let lhs = t.var("n");
    let one = t.int("1");
    let minus = t.binary(NodeKind::Minus, lhs, one);
    let step = t.assign("n", minus);
    let body = t.stmts([step]);
    let looped = t.node(NodeKind::While, [cond, body]);
    let stmts = t.stmts([n, looped]);
    let spin = t.function(NodeKind::TVoid, "spin", stmts);
    let module = compile(t.program([spin])).unwrap();

    assert_eq!(
        block_names(&module, "spin"),
        vec!["entry", "while_loop_cond", "while_loop_body", "while_loop_end"]
    );
    let text = module.to_string();
    assert!(text.contains("icmp sgt i32"));
    assert!(text.contains("sub i32"));
    assert!(text.contains("br label %while_loop_cond"));
}

#[test]
fn nested_ifs_get_suffixed_blocks() {
    let mut t = Tree::new();
    let branch = |t: &mut Tree, body: Vec<NodeId>| {
        let l = t.int("1");
        let r = t.int("2");
        let cond = t.binary(NodeKind::Eq, l, r);
        let then = t.stmts(body);
        t.node(NodeKind::If, [cond, then])
    };
    let inner = branch(&mut t, Vec::new());
    let outer = branch(&mut t, vec![inner]);
    let body = t.stmts([outer]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let module = compile(t.program([main])).unwrap();

    assert_eq!(
        block_names(&module, "main"),
        vec![
            "entry",
            "if_block",
            "merge_block",
            "if_block.1",
            "merge_block.1"
        ]
    );
}

#[test]
fn returning_branches_leave_merge_unterminated() {
    // int pick() { if (1 < 2) { return 1; } else { return 2; } }
    let mut t = Tree::new();
    let l = t.int("1");
    let r = t.int("2");
    let cond = t.binary(NodeKind::Less, l, r);
    let one = t.int("1");
    let ret_one = t.ret(Some(one));
    let then = t.stmts([ret_one]);
    let two = t.int("2");
    let ret_two = t.ret(Some(two));
    let otherwise = t.node(NodeKind::Else, [ret_two]);
    let branch = t.node(NodeKind::If, [cond, then, otherwise]);
    let body = t.stmts([branch]);
    let pick = t.function(NodeKind::TInt, "pick", body);
    let module = compile(t.program([pick])).unwrap();

    let (_, pick) = module.function_by_name("pick").unwrap();
    let merge = pick.block(pick.block_by_name("merge_block").unwrap());
    assert_eq!(merge.terminator, None);
    assert!(module.to_string().contains("merge_block:\n  unreachable\n"));
}

#[test]
fn string_return_type_is_rejected() {
    let mut t = Tree::new();
    let text = t.string("no");
    let ret = t.ret(Some(text));
    let body = t.stmts([ret]);
    let greet = t.function(NodeKind::TString, "greet", body);
    let err = compile(t.program([greet])).unwrap_err();

    assert!(matches!(
        err,
        CodegenError::UnsupportedValueType {
            ty: ValueType::String,
            context: "as a function return type",
            ..
        }
    ));
}

#[test]
fn code_after_return_lands_in_a_fresh_block() {
    // void main() { if (1 < 2) { return; print_int(1); } return; print_int(2); }
    let mut t = Tree::new();
    let l = t.int("1");
    let r = t.int("2");
    let cond = t.binary(NodeKind::Less, l, r);
    let early = t.ret(None);
    let one = t.int("1");
    let dead_then = t.call("print_int", [one]);
    let then = t.stmts([early, dead_then]);
    let branch = t.node(NodeKind::If, [cond, then]);
    let done = t.ret(None);
    let two = t.int("2");
    let dead_tail = t.call("print_int", [two]);
    let body = t.stmts([branch, done, dead_tail]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let module = compile(t.program([main])).unwrap();

    assert_eq!(
        block_names(&module, "main"),
        vec!["entry", "if_block", "merge_block", "after_return", "after_return.1"]
    );
    let (_, main) = module.function_by_name("main").unwrap();
    let merge = main.block_by_name("merge_block").unwrap();
    let inner = main.block(main.block_by_name("after_return").unwrap());
    assert!(matches!(inner.instructions[..], [Instruction::Call { .. }]));
    assert_eq!(inner.terminator, Some(Terminator::Br(merge)));
    let tail = main.block(main.block_by_name("after_return.1").unwrap());
    assert!(matches!(tail.instructions[..], [Instruction::Call { .. }]));
    assert_eq!(tail.terminator, Some(Terminator::RetVoid));
}

#[test]
fn string_literal_argument_is_copied_to_the_stack() {
    let mut t = Tree::new();
    let text = t.string("hey");
    let print = t.call("print_string", [text]);
    let body = t.stmts([print]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let module = compile(t.program([main])).unwrap();

    let text = module.to_string();
    assert!(text.contains("  %.1 = alloca [4 x i8]\n"));
    assert!(text.contains("  store [4 x i8] c\"hey\\00\", ptr %.1\n"));
    assert!(text.contains("  %.2 = getelementptr [4 x i8], ptr %.1, i32 0, i32 0\n"));
    assert!(text.contains("  call void @print_string(ptr %.2)\n"));
    assert!(text.contains("  ret void\n"));
}

#[test]
fn string_variable_argument_points_at_its_storage() {
    let mut t = Tree::new();
    let text = t.string("abc");
    let s = t.local("s", text);
    let arg = t.var("s");
    let print = t.call("print_string", [arg]);
    let body = t.stmts([s, print]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let module = compile(t.program([main])).unwrap();

    let text = module.to_string();
    assert!(text.contains("  %s-2 = alloca [4 x i8]\n"));
    assert!(text.contains("getelementptr [4 x i8], ptr %s-2, i32 0, i32 0"));
}

#[test]
fn addition_folds_from_zero() {
    let mut t = Tree::new();
    let a = t.int("1");
    let b = t.int("2");
    let c = t.int("3");
    let sum = t.node(NodeKind::Plus, [a, b, c]);
    let x = t.local("x", sum);
    let body = t.stmts([x]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let text = compile(t.program([main])).unwrap().to_string();

    assert!(text.contains("  %.1 = add i32 0, 1\n"));
    assert!(text.contains("  %.2 = add i32 %.1, 2\n"));
    assert!(text.contains("  %.3 = add i32 %.2, 3\n"));
    assert!(text.contains("  store i32 %.3, ptr %x-2\n"));
}

#[test]
fn subtraction_needs_two_operands() {
    let mut t = Tree::new();
    let a = t.int("1");
    let b = t.int("2");
    let c = t.int("3");
    let diff = t.node(NodeKind::Minus, [a, b, c]);
    let x = t.local("x", diff);
    let body = t.stmts([x]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let err = compile(t.program([main])).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnsupportedArity {
            kind: NodeKind::Minus,
            expected: 2,
            found: 3,
            ..
        }
    ));
}

#[test]
fn multiplication_is_rejected() {
    let mut t = Tree::new();
    let a = t.int("2");
    let b = t.int("3");
    let product = t.binary(NodeKind::Star, a, b);
    let x = t.local("x", product);
    let body = t.stmts([x]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let err = compile(t.program([main])).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnsupportedExpression {
            kind: NodeKind::Star,
            ..
        }
    ));
}

#[test]
fn local_outside_a_function_has_no_insertion_point() {
    let mut t = Tree::new();
    let one = t.int("1");
    let x = t.local("x", one);
    let err = compile(t.program([x])).unwrap_err();
    assert_eq!(err, CodegenError::Ir(LlirError::NoInsertionPoint));
}

#[test]
fn call_arity_is_checked() {
    let mut t = Tree::new();
    let a = t.int("1");
    let b = t.int("2");
    let print = t.call("print_int", [a, b]);
    let body = t.stmts([print]);
    let main = t.function(NodeKind::TVoid, "main", body);
    let err = compile(t.program([main])).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnsupportedArity {
            kind: NodeKind::FuncCall,
            expected: 1,
            found: 2,
            ..
        }
    ));
}

#[test]
fn oversized_int_literal_is_rejected() {
    let mut t = Tree::new();
    let big = t.int("4294967296");
    let x = t.global("x", big);
    let err = compile(t.program([x])).unwrap_err();
    assert!(matches!(err, CodegenError::InvalidIntLiteral { .. }));
}

#[test]
fn functions_can_call_earlier_and_themselves() {
    // int f() { return 1; }  void g() { f(); g(); }
    let mut t = Tree::new();
    let one = t.int("1");
    let ret = t.ret(Some(one));
    let body = t.stmts([ret]);
    let f = t.function(NodeKind::TInt, "f", body);
    let call_f = t.call("f", []);
    let call_g = t.call("g", []);
    let body = t.stmts([call_f, call_g]);
    let g = t.function(NodeKind::TVoid, "g", body);
    let text = compile(t.program([f, g])).unwrap().to_string();

    assert!(text.contains("define i32 @f() {"));
    assert!(text.contains("  %.1 = call i32 @f()\n"));
    assert!(text.contains("  call void @g()\n"));
}
