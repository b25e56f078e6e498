use predicates::prelude::*;

use super::common::TestEnvironment;

#[test]
fn test_encode_with_contains_and_reference() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["filter", "encode", "status=true", "owner=ann", "--contains", "owner", "--ref", "owner=UserEntity.login"])
        .assert()
        .success()
        .stdout("::status:true::owner:%ann%{UserEntity.login}\n");
}

#[test]
fn test_encode_date_range() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["filter", "encode", "--range", "due=1700000000000..2024-01-14T22:13:20Z"])
        .assert()
        .success()
        .stdout("::due:FROM1700000000000TO1705270400000\n");
}

#[test]
fn test_encode_rejects_ambiguous_value() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["filter", "encode", "note=a::b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_decode_describes_clauses() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["filter", "decode", "::owner:%ann%{UserEntity.login}::done:false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("owner: contains 'ann' on UserEntity.login"))
        .stdout(predicate::str::contains("done: equals 'false'"));
}

#[test]
fn test_decode_empty_token() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["filter", "decode", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("No filter clauses."));
}

#[test]
fn test_decode_lenient_warns_on_malformed_clause() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["filter", "decode", "::broken::done:true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("done: equals 'true'"))
        .stderr(predicate::str::contains("warning"));
}

#[test]
fn test_decode_strict_fails_on_malformed_clause() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["filter", "decode", "--strict", "::broken::done:true"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_decode_json_output() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["filter", "decode", "--json", "::done:true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"done\": \"true\""));
}
