#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};
use xcproj_helper::project::{DESCRIPTOR_NAME, PhaseKind, Project};

/// Which build phases of `App` list `Helper.m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperIn {
    Sources,
    Resources,
    Both,
    Neither,
}

#[derive(Debug, Clone, Copy)]
pub struct FixtureOptions {
    pub helper_in: HelperIn,
    /// Adds a second group named `Widget` under the `App` group.
    pub duplicate_widget_group: bool,
    /// Lists `Helper.m` twice in `App`'s Sources phase.
    pub duplicate_build_file: bool,
    /// Adds a group `Shared` with `path = ../Shared`, a directory next to
    /// the project root.
    pub shared_sibling_group: bool,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            helper_in: HelperIn::Sources,
            duplicate_widget_group: false,
            duplicate_build_file: false,
            shared_sibling_group: false,
        }
    }
}

/// A throwaway `Repo/Proj.xcodeproj` with targets `App` and `Widget` (plus
/// the aggregate target `Lint`) and matching files on disk:
///
/// ```text
/// Repo/App/Sources/main.m
/// Repo/App/Sources/Helper.m
/// Repo/App/Resources/Data.json
/// Repo/Widget/WidgetMain.m
/// Shared/                      (with `shared_sibling_group`)
/// ```
pub struct Fixture {
    pub dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    pub fn new(helper_in: HelperIn) -> Self {
        Self::with(FixtureOptions {
            helper_in,
            ..FixtureOptions::default()
        })
    }

    pub fn with(options: FixtureOptions) -> Self {
        let dir = tempdir().expect("create tmp dir");
        let root = dir.path().join("Repo");

        for (path, content) in [
            ("App/Sources/main.m", "int main(void) { return 0; }\n"),
            ("App/Sources/Helper.m", "// Helper\n"),
            ("App/Resources/Data.json", "{}\n"),
            ("Widget/WidgetMain.m", "// Widget\n"),
        ] {
            let path = root.join(path);
            fs::create_dir_all(path.parent().expect("parent dir")).expect("create dir");
            fs::write(&path, content).expect("write fixture file");
        }
        if options.duplicate_widget_group {
            fs::create_dir_all(root.join("App").join("Widget")).expect("create dir");
        }
        if options.shared_sibling_group {
            fs::create_dir_all(dir.path().join("Shared")).expect("create dir");
        }

        let bundle = root.join("Proj.xcodeproj");
        fs::create_dir(&bundle).expect("create bundle");
        fs::write(bundle.join(DESCRIPTOR_NAME), descriptor(options)).expect("write descriptor");

        Self { dir, root }
    }

    /// Project root; the directory containing `Proj.xcodeproj`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sibling of the project root, reached by the `Shared` group.
    pub fn shared_dir(&self) -> PathBuf {
        self.dir.path().join("Shared")
    }

    pub fn bundle(&self) -> PathBuf {
        self.root().join("Proj.xcodeproj")
    }

    pub fn descriptor(&self) -> PathBuf {
        self.bundle().join(DESCRIPTOR_NAME)
    }

    pub fn helper(&self) -> PathBuf {
        self.root().join("App").join("Sources").join("Helper.m")
    }

    pub fn widget_dir(&self) -> PathBuf {
        self.root().join("Widget")
    }

    pub fn open(&self) -> Project {
        Project::open(self.bundle()).expect("open fixture project")
    }
}

/// Resolved paths listed in a target's phase; empty when the phase is absent.
pub fn phase_paths(project: &Project, target: &str, kind: PhaseKind) -> Vec<PathBuf> {
    let target = project.native_target_named(target).expect("target exists");
    match project.build_phase(target, kind) {
        Some(phase) => project
            .phase_file_references(phase)
            .into_iter()
            .filter_map(|file_ref| project.real_path(file_ref))
            .collect(),
        None => Vec::new(),
    }
}

fn descriptor(options: FixtureOptions) -> String {
    let in_sources = matches!(options.helper_in, HelperIn::Sources | HelperIn::Both);
    let in_resources = matches!(options.helper_in, HelperIn::Resources | HelperIn::Both);

    let mut build_files = vec![
        "\t\t0B0000000000000000000001 /* main.m in Sources */ = {isa = PBXBuildFile; fileRef = 0F0000000000000000000001 /* main.m */; };",
        "\t\t0B0000000000000000000004 /* Data.json in Resources */ = {isa = PBXBuildFile; fileRef = 0F0000000000000000000003 /* Data.json */; };",
        "\t\t0B0000000000000000000005 /* WidgetMain.m in Sources */ = {isa = PBXBuildFile; fileRef = 0F0000000000000000000005 /* WidgetMain.m */; };",
    ];
    let mut app_sources = vec!["0B0000000000000000000001 /* main.m in Sources */"];
    let mut app_resources = vec!["0B0000000000000000000004 /* Data.json in Resources */"];
    if in_sources {
        build_files.push("\t\t0B0000000000000000000002 /* Helper.m in Sources */ = {isa = PBXBuildFile; fileRef = 0F0000000000000000000002 /* Helper.m */; };");
        app_sources.push("0B0000000000000000000002 /* Helper.m in Sources */");
    }
    if options.duplicate_build_file {
        build_files.push("\t\t0B0000000000000000000006 /* Helper.m in Sources */ = {isa = PBXBuildFile; fileRef = 0F0000000000000000000002 /* Helper.m */; };");
        app_sources.push("0B0000000000000000000006 /* Helper.m in Sources */");
    }
    if in_resources {
        build_files.push("\t\t0B0000000000000000000003 /* Helper.m in Resources */ = {isa = PBXBuildFile; fileRef = 0F0000000000000000000002 /* Helper.m */; };");
        app_resources.push("0B0000000000000000000003 /* Helper.m in Resources */");
    }

    let mut app_group_children = vec![
        "0C0000000000000000000002 /* Sources */",
        "0C0000000000000000000003 /* Resources */",
    ];
    let mut main_group_children = vec![
        "0C0000000000000000000001 /* App */",
        "0C0000000000000000000004 /* Widget */",
        "0C0000000000000000000005 /* Products */",
    ];
    let mut extra_groups = String::new();
    if options.duplicate_widget_group {
        app_group_children.push("0C0000000000000000000006 /* Widget */");
        extra_groups.push_str(
            "\t\t0C0000000000000000000006 /* Widget */ = {
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
\t\t\t);
\t\t\tpath = Widget;
\t\t\tsourceTree = \"<group>\";
\t\t};
",
        );
    }
    if options.shared_sibling_group {
        main_group_children.push("0C0000000000000000000007 /* Shared */");
        extra_groups.push_str(
            "\t\t0C0000000000000000000007 /* Shared */ = {
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
\t\t\t);
\t\t\tname = Shared;
\t\t\tpath = ../Shared;
\t\t\tsourceTree = \"<group>\";
\t\t};
",
        );
    }

    let list = |items: &[&str]| -> String {
        items
            .iter()
            .map(|item| format!("\t\t\t\t{item},\n"))
            .collect()
    };

    format!(
        "// !$*UTF8*$!
{{
\tarchiveVersion = 1;
\tclasses = {{
\t}};
\tobjectVersion = 56;
\tobjects = {{

/* Begin PBXAggregateTarget section */
\t\t0D0000000000000000000003 /* Lint */ = {{
\t\t\tisa = PBXAggregateTarget;
\t\t\tbuildPhases = (
\t\t\t);
\t\t\tdependencies = (
\t\t\t);
\t\t\tname = Lint;
\t\t\tproductName = Lint;
\t\t}};
/* End PBXAggregateTarget section */

/* Begin PBXBuildFile section */
{build_files}
/* End PBXBuildFile section */

/* Begin PBXFileReference section */
\t\t0F0000000000000000000001 /* main.m */ = {{isa = PBXFileReference; lastKnownFileType = sourcecode.c.objc; path = main.m; sourceTree = \"<group>\"; }};
\t\t0F0000000000000000000002 /* Helper.m */ = {{isa = PBXFileReference; lastKnownFileType = sourcecode.c.objc; path = Helper.m; sourceTree = \"<group>\"; }};
\t\t0F0000000000000000000003 /* Data.json */ = {{isa = PBXFileReference; lastKnownFileType = text.json; path = Data.json; sourceTree = \"<group>\"; }};
\t\t0F0000000000000000000004 /* App.app */ = {{isa = PBXFileReference; explicitFileType = wrapper.application; includeInIndex = 0; path = App.app; sourceTree = BUILT_PRODUCTS_DIR; }};
\t\t0F0000000000000000000005 /* WidgetMain.m */ = {{isa = PBXFileReference; lastKnownFileType = sourcecode.c.objc; path = WidgetMain.m; sourceTree = \"<group>\"; }};
/* End PBXFileReference section */

/* Begin PBXFrameworksBuildPhase section */
\t\t0E0000000000000000000003 /* Frameworks */ = {{
\t\t\tisa = PBXFrameworksBuildPhase;
\t\t\tbuildActionMask = 2147483647;
\t\t\tfiles = (
\t\t\t);
\t\t\trunOnlyForDeploymentPostprocessing = 0;
\t\t}};
/* End PBXFrameworksBuildPhase section */

/* Begin PBXGroup section */
\t\t0C0000000000000000000000 = {{
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
{main_group_children}\t\t\t);
\t\t\tsourceTree = \"<group>\";
\t\t}};
\t\t0C0000000000000000000001 /* App */ = {{
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
{app_group_children}\t\t\t);
\t\t\tpath = App;
\t\t\tsourceTree = \"<group>\";
\t\t}};
\t\t0C0000000000000000000002 /* Sources */ = {{
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
\t\t\t\t0F0000000000000000000001 /* main.m */,
\t\t\t\t0F0000000000000000000002 /* Helper.m */,
\t\t\t);
\t\t\tpath = Sources;
\t\t\tsourceTree = \"<group>\";
\t\t}};
\t\t0C0000000000000000000003 /* Resources */ = {{
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
\t\t\t\t0F0000000000000000000003 /* Data.json */,
\t\t\t);
\t\t\tpath = Resources;
\t\t\tsourceTree = \"<group>\";
\t\t}};
\t\t0C0000000000000000000004 /* Widget */ = {{
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
\t\t\t\t0F0000000000000000000005 /* WidgetMain.m */,
\t\t\t);
\t\t\tpath = Widget;
\t\t\tsourceTree = \"<group>\";
\t\t}};
\t\t0C0000000000000000000005 /* Products */ = {{
\t\t\tisa = PBXGroup;
\t\t\tchildren = (
\t\t\t\t0F0000000000000000000004 /* App.app */,
\t\t\t);
\t\t\tname = Products;
\t\t\tsourceTree = \"<group>\";
\t\t}};
{extra_groups}/* End PBXGroup section */

/* Begin PBXNativeTarget section */
\t\t0D0000000000000000000001 /* App */ = {{
\t\t\tisa = PBXNativeTarget;
\t\t\tbuildPhases = (
\t\t\t\t0E0000000000000000000001 /* Sources */,
\t\t\t\t0E0000000000000000000002 /* Resources */,
\t\t\t\t0E0000000000000000000003 /* Frameworks */,
\t\t\t);
\t\t\tbuildRules = (
\t\t\t);
\t\t\tdependencies = (
\t\t\t);
\t\t\tname = App;
\t\t\tproductName = App;
\t\t\tproductReference = 0F0000000000000000000004 /* App.app */;
\t\t\tproductType = \"com.apple.product-type.application\";
\t\t}};
\t\t0D0000000000000000000002 /* Widget */ = {{
\t\t\tisa = PBXNativeTarget;
\t\t\tbuildPhases = (
\t\t\t\t0E0000000000000000000004 /* Sources */,
\t\t\t\t0E0000000000000000000005 /* Resources */,
\t\t\t);
\t\t\tbuildRules = (
\t\t\t);
\t\t\tdependencies = (
\t\t\t);
\t\t\tname = Widget;
\t\t\tproductName = Widget;
\t\t\tproductType = \"com.apple.product-type.app-extension\";
\t\t}};
/* End PBXNativeTarget section */

/* Begin PBXProject section */
\t\t0A0000000000000000000001 /* Project object */ = {{
\t\t\tisa = PBXProject;
\t\t\tcompatibilityVersion = \"Xcode 14.0\";
\t\t\tmainGroup = 0C0000000000000000000000;
\t\t\tproductRefGroup = 0C0000000000000000000005 /* Products */;
\t\t\tprojectDirPath = \"\";
\t\t\tprojectRoot = \"\";
\t\t\ttargets = (
\t\t\t\t0D0000000000000000000001 /* App */,
\t\t\t\t0D0000000000000000000002 /* Widget */,
\t\t\t\t0D0000000000000000000003 /* Lint */,
\t\t\t);
\t\t}};
/* End PBXProject section */

/* Begin PBXResourcesBuildPhase section */
\t\t0E0000000000000000000002 /* Resources */ = {{
\t\t\tisa = PBXResourcesBuildPhase;
\t\t\tbuildActionMask = 2147483647;
\t\t\tfiles = (
{app_resources}\t\t\t);
\t\t\trunOnlyForDeploymentPostprocessing = 0;
\t\t}};
\t\t0E0000000000000000000005 /* Resources */ = {{
\t\t\tisa = PBXResourcesBuildPhase;
\t\t\tbuildActionMask = 2147483647;
\t\t\tfiles = (
\t\t\t);
\t\t\trunOnlyForDeploymentPostprocessing = 0;
\t\t}};
/* End PBXResourcesBuildPhase section */

/* Begin PBXSourcesBuildPhase section */
\t\t0E0000000000000000000001 /* Sources */ = {{
\t\t\tisa = PBXSourcesBuildPhase;
\t\t\tbuildActionMask = 2147483647;
\t\t\tfiles = (
{app_sources}\t\t\t);
\t\t\trunOnlyForDeploymentPostprocessing = 0;
\t\t}};
\t\t0E0000000000000000000004 /* Sources */ = {{
\t\t\tisa = PBXSourcesBuildPhase;
\t\t\tbuildActionMask = 2147483647;
\t\t\tfiles = (
\t\t\t\t0B0000000000000000000005 /* WidgetMain.m in Sources */,
\t\t\t);
\t\t\trunOnlyForDeploymentPostprocessing = 0;
\t\t}};
/* End PBXSourcesBuildPhase section */
\t}};
\trootObject = 0A0000000000000000000001 /* Project object */;
}}
",
        build_files = build_files.join("\n"),
        main_group_children = list(&main_group_children),
        app_group_children = list(&app_group_children),
        app_sources = list(&app_sources),
        app_resources = list(&app_resources),
        extra_groups = extra_groups,
    )
}
