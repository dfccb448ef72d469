use predicates::prelude::predicate;

mod common;

#[test]
fn init_creates_the_repository_skeleton() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;

    common::run_jit(dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty jit repository"));

    for path in [
        ".jit/objects",
        ".jit/refs/heads",
        ".jit/logs/refs/heads",
        ".jit/branches",
    ] {
        assert!(dir.path().join(path).is_dir(), "missing {path}");
    }

    assert_eq!(common::read_ref(dir.path(), "HEAD"), "refs/heads/master");
    assert_eq!(
        common::read_ref(dir.path(), "refs/heads/master"),
        "0".repeat(40)
    );
    assert!(dir.path().join(".jit/index").exists());

    Ok(())
}

#[test]
fn init_refuses_to_run_twice() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::init_repository();

    common::run_jit(dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    Ok(())
}

#[test]
fn verbs_fail_outside_a_repository() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;

    common::run_jit(dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a jit repository"));

    Ok(())
}
