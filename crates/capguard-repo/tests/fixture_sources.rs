//! Reads the `anchored_imports` fixture the way `capguard check --source-root` does.

use camino::Utf8PathBuf;
use capguard_domain::{LocationResolver, Resolution};
use capguard_repo::{SourceResolver, find_go_module, load_capslock, scan_imports};

fn fixture() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures/anchored_imports")
        .canonicalize_utf8()
        .expect("fixture exists")
}

#[test]
fn module_is_found_from_a_nested_package_dir() {
    let root = fixture();
    let module = find_go_module(&root.join("cmd/tool"))
        .expect("read go.mod")
        .expect("go.mod present");

    assert_eq!(module.path, "example.com/app");
    assert_eq!(module.root, root);
    assert_eq!(
        module.package_dir("example.com/app/cmd/tool"),
        Some(root.join("cmd/tool"))
    );
}

#[test]
fn test_files_do_not_contribute_imports() {
    let sites = scan_imports(&fixture().join("cmd/tool")).expect("scan");
    let paths: Vec<&str> = sites.iter().map(|s| s.import_path.as_str()).collect();

    assert_eq!(paths, vec!["fmt", "github.com/acme/net"]);
}

#[test]
fn resolver_anchors_direct_imports_only() {
    let root = fixture();
    let module = find_go_module(&root).expect("go.mod").expect("module");
    let origins = vec!["example.com/app/cmd/tool".to_string()];
    let resolver = SourceResolver::scan(&root, &module, &origins).expect("scan");

    match resolver.resolve("example.com/app/cmd/tool", "github.com/acme/net") {
        Resolution::At(loc) => {
            assert_eq!(loc.path.as_str(), "cmd/tool/main.go");
            assert_eq!(loc.line, Some(6));
            assert_eq!(loc.col, Some(2));
        }
        other => panic!("expected a location, got {other:?}"),
    }
    assert_eq!(
        resolver.resolve("example.com/app/cmd/tool", "github.com/google/uuid"),
        Resolution::Unresolved
    );
}

#[test]
fn fixture_capslock_document_loads() {
    let report = load_capslock(&fixture().join("capslock.json")).expect("load");
    assert!(!report.capability_info.is_empty());
}
