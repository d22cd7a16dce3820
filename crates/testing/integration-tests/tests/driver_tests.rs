//! The driver end to end, writing into a temporary directory

use integration_tests::fixture_path;
use oat_driver::{Driver, DriverConfig, GraphvizConfig, Rendered, Request};
use std::path::Path;

fn driver() -> Driver {
    Driver::new(DriverConfig {
        module_name: None,
        graphviz: GraphvizConfig {
            program: "oatc-test-missing-graphviz".to_string(),
            ..GraphvizConfig::default()
        },
    })
}

fn request(dir: &Path, fixture: &str, with_ir: bool) -> Request {
    Request {
        ast: fixture_path(fixture),
        image: dir.join(format!("{fixture}.png")),
        ir: with_ir.then(|| dir.join(format!("{fixture}.ll"))),
    }
}

#[test]
fn missing_graphviz_leaves_dot_source_next_to_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let report = driver().run(&request(dir.path(), "for_loop", false)).unwrap();

    assert_eq!(
        report.tree,
        Rendered::DotSource(dir.path().join("for_loop.png.dot"))
    );
    let dump = std::fs::read_to_string(report.tree.path()).unwrap();
    assert!(dump.contains(r#"label="FOR_LOOP\nfor\ntype: NONE""#));
}

#[test]
fn full_run_writes_ir_and_annotated_tree() {
    let dir = tempfile::tempdir().unwrap();
    let report = driver().run(&request(dir.path(), "while_loop", true)).unwrap();

    let ir = std::fs::read_to_string(dir.path().join("while_loop.ll")).unwrap();
    assert!(ir.starts_with("; ModuleID = 'while_loop'"));
    assert!(ir.contains("define void @main()"));
    assert_eq!(report.module.unwrap().to_string(), ir);

    let dump = std::fs::read_to_string(report.tree.path()).unwrap();
    assert!(dump.contains(r"ID\nn-2\ntype: INT"));
}

#[test]
fn configured_module_name_wins() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("oatc.toml");
    std::fs::write(
        &config_path,
        "module_name = \"renamed\"\n[graphviz]\nenabled = false\n",
    )
    .unwrap();
    let config = DriverConfig::from_file(&config_path).unwrap();

    Driver::new(config)
        .run(&request(dir.path(), "global_int", true))
        .unwrap();
    let ir = std::fs::read_to_string(dir.path().join("global_int.ll")).unwrap();
    assert!(ir.starts_with("; ModuleID = 'renamed'\n"));
}

#[test]
fn failed_analysis_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = driver()
        .run(&request(dir.path(), "undefined", true))
        .unwrap_err();

    assert!(format!("{err:#}").contains("undefined symbol `prnt_int`"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
