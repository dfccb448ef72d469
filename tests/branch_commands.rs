use predicates::prelude::predicate;

mod common;

#[test]
fn creating_a_branch_switches_head_onto_it() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();
    let tip = common::commit_file(dir.path(), "file.txt", "hello\n", "first");

    common::run_jit(dir.path(), &["checkout", "-b", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to a new branch 'feature'"));

    assert_eq!(common::read_ref(dir.path(), "HEAD"), "refs/heads/feature");
    assert_eq!(common::read_ref(dir.path(), "refs/heads/feature"), tip);

    // the branch log records the creation
    let log = common::read_file(dir.path(), ".jit/logs/refs/heads/feature");
    assert!(log.contains("branch: feature"));

    Ok(())
}

#[test]
fn branch_names_are_validated() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();

    common::run_jit(dir.path(), &["checkout", "-b", "bad name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid branch name"));

    Ok(())
}

#[test]
fn a_dirty_worktree_blocks_branch_creation() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();
    common::commit_file(dir.path(), "file.txt", "hello\n", "first");

    common::write_file(dir.path(), "file.txt", "changed\n");

    common::run_jit(dir.path(), &["checkout", "-b", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "You have uncommitted changes! Please commit them first",
        ));

    Ok(())
}

#[test]
fn branches_are_listed_with_the_current_one_marked() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();
    common::commit_file(dir.path(), "file.txt", "hello\n", "first");
    common::run_jit(dir.path(), &["checkout", "-b", "feature"])
        .assert()
        .success();

    common::run_jit(dir.path(), &["branch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* feature"))
        .stdout(predicate::str::contains("master"));

    Ok(())
}

#[test]
fn checkout_restores_the_branch_state() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();
    common::commit_file(dir.path(), "file.txt", "hello\nworld\n", "base");

    common::run_jit(dir.path(), &["checkout", "-b", "feature"])
        .assert()
        .success();
    common::run_jit(dir.path(), &["commit", "empty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to commit"));

    common::commit_file(dir.path(), "file.txt", "feature change\n", "on feature");
    assert_eq!(
        common::read_file(dir.path(), "file.txt"),
        "feature change\n"
    );

    common::run_jit(dir.path(), &["checkout", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Head now at master"));

    // the file is restored to the pre-branch state
    assert_eq!(common::read_file(dir.path(), "file.txt"), "hello\nworld\n");
    assert_eq!(common::read_ref(dir.path(), "HEAD"), "refs/heads/master");

    Ok(())
}

#[test]
fn checkout_removes_files_absent_from_the_target() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();
    common::commit_file(dir.path(), "file.txt", "hello\n", "base");

    common::run_jit(dir.path(), &["checkout", "-b", "feature"])
        .assert()
        .success();
    common::commit_file(dir.path(), "extra.txt", "extra\n", "add extra");

    common::run_jit(dir.path(), &["checkout", "master"])
        .assert()
        .success();

    assert!(!dir.path().join("extra.txt").exists());
    assert!(dir.path().join("file.txt").exists());

    Ok(())
}

#[test]
fn checking_out_an_unknown_target_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();
    common::commit_file(dir.path(), "file.txt", "hello\n", "base");

    common::run_jit(dir.path(), &["checkout", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No branch named nope"));

    Ok(())
}

#[test]
fn a_dirty_worktree_blocks_checkout() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();
    common::commit_file(dir.path(), "file.txt", "hello\n", "base");
    common::run_jit(dir.path(), &["checkout", "-b", "feature"])
        .assert()
        .success();

    common::write_file(dir.path(), "file.txt", "dirty\n");

    common::run_jit(dir.path(), &["checkout", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("uncommitted changes"));

    Ok(())
}
