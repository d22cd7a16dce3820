//! Fixture trees through analysis and code generation, checked on the printed IR

use expect_test::expect;
use integration_tests::{compile_fixture, load_fixture};
use oat_codegen::CodegenError;
use oat_resolve::ResolutionError;
use oat_syntax::NodeKind;

#[test]
fn lone_global_compiles_to_one_constant() {
    let module = compile_fixture("global_int").unwrap();
    expect![[r#"
        ; ModuleID = 'global_int'
        source_filename = "global_int"

        declare ptr @array_of_string(ptr)
        declare ptr @string_of_array(ptr)
        declare i32 @length_of_string(ptr)
        declare ptr @string_of_int(i32)
        declare ptr @string_cat(ptr, ptr)
        declare void @print_string(ptr)
        declare void @print_int(i32)
        declare void @print_bool(i32)

        @x-1 = private constant i32 5
    "#]]
    .assert_eq(&module.to_string());
}

#[test]
fn branch_reads_globals_and_locals() {
    let module = compile_fixture("branch").unwrap();
    let (_, main) = module.function_by_name("main").unwrap();
    expect![[r#"
        define i32 @main() {
        entry:
          %a-2 = alloca i32
          store i32 1, ptr %a-2
          %.1 = load i32, ptr %a-2
          %.2 = load i32, ptr @x-1
          %.3 = icmp slt i32 %.1, %.2
          br i1 %.3, label %if_block, label %merge_block

        if_block:
          %.4 = load i32, ptr %a-2
          call void @print_int(i32 %.4)
          br label %merge_block

        merge_block:
          %.5 = load i32, ptr %a-2
          ret i32 %.5
        }
    "#]]
    .assert_eq(&main.to_string());
}

#[test]
fn for_loop_lowers_to_cond_body_end() {
    let module = compile_fixture("for_loop").unwrap();
    let (_, main) = module.function_by_name("main").unwrap();
    expect![[r#"
        define void @main() {
        entry:
          %i-3 = alloca i32
          store i32 0, ptr %i-3
          br label %for_loop_cond

        for_loop_cond:
          %.1 = load i32, ptr %i-3
          %.2 = icmp slt i32 %.1, 5
          br i1 %.2, label %for_loop_body, label %for_loop_end

        for_loop_body:
          %.3 = load i32, ptr %i-3
          call void @print_int(i32 %.3)
          %.4 = load i32, ptr %i-3
          %.5 = add i32 0, %.4
          %.6 = add i32 %.5, 1
          store i32 %.6, ptr %i-3
          br label %for_loop_cond

        for_loop_end:
          ret void
        }
    "#]]
    .assert_eq(&main.to_string());
}

#[test]
fn if_else_blocks_join_at_merge() {
    let module = compile_fixture("if_else").unwrap();
    let (_, main) = module.function_by_name("main").unwrap();
    let names: Vec<_> = main.blocks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["entry", "if_block", "else_block", "merge_block"]);

    let merge = main.block_by_name("merge_block").unwrap();
    for name in ["if_block", "else_block"] {
        let block = main.block(main.block_by_name(name).unwrap());
        assert_eq!(block.successors(), vec![merge]);
    }
}

#[test]
fn while_loop_blocks() {
    let module = compile_fixture("while_loop").unwrap();
    let (_, main) = module.function_by_name("main").unwrap();
    let names: Vec<_> = main.blocks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        ["entry", "while_loop_cond", "while_loop_body", "while_loop_end"]
    );
}

#[test]
fn string_global_is_sized_after_escapes() {
    let module = compile_fixture("strings").unwrap();
    let text = module.to_string();
    assert!(text.contains("@greeting-1 = private constant [7 x i8] c\"hello\\0A\\00\"\n"));
    assert!(text.contains("getelementptr [7 x i8], ptr @greeting-1, i32 0, i32 0"));
}

#[test]
fn shadowed_names_get_distinct_slots() {
    let module = compile_fixture("shadowing").unwrap();
    let text = module.to_string();
    assert!(text.contains("@x-1 = private constant i32 1"));
    assert!(text.contains("%x-2 = alloca i32"));
    assert!(text.contains("%x-3 = alloca i32"));
}

#[test]
fn undefined_callee_stops_before_generation() {
    let err = compile_fixture("undefined").unwrap_err();
    let Some(ResolutionError::UndefinedSymbol {
        name, suggestions, ..
    }) = err.downcast_ref::<ResolutionError>()
    else {
        panic!("expected an undefined symbol, got {err:#}");
    };
    assert_eq!(name, "prnt_int");
    assert!(suggestions.iter().any(|s| s == "print_int"));
}

#[test]
fn multiplication_has_no_lowering() {
    let err = compile_fixture("multiply").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CodegenError>(),
        Some(CodegenError::UnsupportedExpression {
            kind: NodeKind::Star,
            ..
        })
    ));
}

#[test]
fn analysis_annotates_the_dumped_tree() {
    let mut ast = load_fixture("shadowing").unwrap();
    let before = oat_dot::write_ast(&ast);
    assert!(before.contains(r"ID\nx\ntype: NONE"));

    let analysis = oat_resolve::analyze(&mut ast).unwrap();
    assert_eq!(analysis.final_depth, 0);
    let after = oat_dot::write_ast(&ast);
    for unique in ["x-1", "x-2", "x-3"] {
        assert!(after.contains(&format!(r"ID\n{unique}\ntype: INT")), "{unique}");
    }

    // the dump reads back as the same tree
    let reread = oat_dot::read_ast(&after).unwrap();
    assert_eq!(reread.len(), ast.len());
}
