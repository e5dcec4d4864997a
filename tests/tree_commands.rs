mod common;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{init_repository_dir, repository_dir, run_kit_command};
use common::file::{FileSpec, create_directory, write_file};
use common::{EMPTY_TREE_OID, inflate_object, stdout_line};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

const A_TXT_OID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";
const RUN_SH_OID: &str = "4163036efa65bd4a469e752267498f01ea36a55c";
const SUB_TREE_OID: &str = "721eea743f274b162a059c0032155c36a62cd740";
const ROOT_TREE_OID: &str = "f5bb430b82de3d2543a6b1c3b217bf2ba4a11046";

fn write_tree(dir: &std::path::Path) -> String {
    let output = run_kit_command(dir, &["write-tree"])
        .output()
        .expect("write-tree runs");
    assert!(output.status.success(), "write-tree failed: {output:?}");
    stdout_line(&output)
}

#[rstest]
fn write_tree_of_an_empty_workspace_is_the_empty_tree(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_kit_command(repository_dir.path(), &["write-tree"])
        .assert()
        .success()
        .stdout(format!("{EMPTY_TREE_OID}\n"));

    assert_eq!(
        inflate_object(repository_dir.path(), EMPTY_TREE_OID),
        b"tree 0\0".to_vec()
    );
}

#[rstest]
fn write_tree_matches_git_digests(init_repository_dir: TempDir) {
    assert_eq!(write_tree(init_repository_dir.path()), ROOT_TREE_OID);

    for oid in [A_TXT_OID, RUN_SH_OID, SUB_TREE_OID, ROOT_TREE_OID] {
        init_repository_dir
            .child(".git/objects")
            .child(&oid[..2])
            .child(&oid[2..])
            .assert(predicate::path::is_file());
    }
}

#[rstest]
fn write_tree_omits_empty_directories(init_repository_dir: TempDir) {
    create_directory(&init_repository_dir.path().join("empty"));
    create_directory(&init_repository_dir.path().join("sub").join("deeper").join("still"));

    assert_eq!(write_tree(init_repository_dir.path()), ROOT_TREE_OID);
}

#[rstest]
fn write_tree_is_idempotent(init_repository_dir: TempDir) {
    let first = write_tree(init_repository_dir.path());
    let second = write_tree(init_repository_dir.path());

    assert_eq!(first, second);
}

#[rstest]
fn write_tree_sorts_directories_as_if_suffixed_with_a_slash(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    for path in ["foo-bar", "foo/x", "foo0"] {
        write_file(FileSpec::new(
            repository_dir.path().join(path),
            "x\n".to_string(),
        ));
    }

    let root = write_tree(repository_dir.path());
    assert_eq!(root, "1cad3718dde83fa216a521ee35d0b914384b031d");

    run_kit_command(repository_dir.path(), &["ls-tree", "--name-only", &root])
        .assert()
        .success()
        .stdout("foo-bar\nfoo\nfoo0\n");
}

#[rstest]
fn ls_tree_prints_full_entries_in_stored_order(init_repository_dir: TempDir) {
    let root = write_tree(init_repository_dir.path());

    let expected = format!(
        "100644 blob {A_TXT_OID}    a.txt\n\
         100755 blob {RUN_SH_OID}    run.sh\n\
         040000 tree {SUB_TREE_OID}    sub\n"
    );
    run_kit_command(init_repository_dir.path(), &["ls-tree", &root])
        .assert()
        .success()
        .stdout(expected);
}

#[rstest]
fn ls_tree_name_only(init_repository_dir: TempDir) {
    let root = write_tree(init_repository_dir.path());

    run_kit_command(init_repository_dir.path(), &["ls-tree", "--name-only", &root])
        .assert()
        .success()
        .stdout("a.txt\nrun.sh\nsub\n");
}

#[rstest]
fn ls_tree_object_only(init_repository_dir: TempDir) {
    let root = write_tree(init_repository_dir.path());

    run_kit_command(init_repository_dir.path(), &["ls-tree", "--object-only", &root])
        .assert()
        .success()
        .stdout(format!("{A_TXT_OID}\n{RUN_SH_OID}\n{SUB_TREE_OID}\n"));
}

#[rstest]
fn ls_tree_rejects_conflicting_flags(init_repository_dir: TempDir) {
    let root = write_tree(init_repository_dir.path());

    run_kit_command(
        init_repository_dir.path(),
        &["ls-tree", "--name-only", "--object-only", &root],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains(
        "--name-only is incompatible with --object-only",
    ));
}

#[rstest]
fn ls_tree_of_a_blob_fails(init_repository_dir: TempDir) {
    write_tree(init_repository_dir.path());

    run_kit_command(init_repository_dir.path(), &["ls-tree", A_TXT_OID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a tree"));
}

#[rstest]
fn cat_file_pretty_prints_a_tree(init_repository_dir: TempDir) {
    write_tree(init_repository_dir.path());

    run_kit_command(init_repository_dir.path(), &["cat-file", "-p", SUB_TREE_OID])
        .assert()
        .success()
        .stdout("100644 blob cc628ccd10742baea8241c5924df992b5c019f71    b.txt\n");

    run_kit_command(init_repository_dir.path(), &["cat-file", "-t", SUB_TREE_OID])
        .assert()
        .success()
        .stdout("tree\n");
}

#[rstest]
fn write_tree_ignores_the_control_directory(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let before = write_tree(init_repository_dir.path());
    init_repository_dir
        .child(".git")
        .child("scratch.txt")
        .write_str("not tracked")?;

    assert_eq!(write_tree(init_repository_dir.path()), before);

    Ok(())
}
