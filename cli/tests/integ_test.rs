#![cfg(feature = "integ")]
use assert_cmd::Command;
use capi_selftest::KindCluster;

/// We will test:
/// `capi-events install`
/// `capi-events status`
/// `capi-events verify` failing when no controller records events
#[test]
fn install_status_verify() {
    let cluster = KindCluster::new("capi-events-cli").unwrap();
    let kubeconfig = cluster.kubeconfig();
    let kubeconfig = kubeconfig.to_str().unwrap();

    let mut cmd = Command::cargo_bin("capi-events").unwrap();
    cmd.args(["--kubeconfig", kubeconfig, "install"]);
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("capi-events").unwrap();
    cmd.args(["--kubeconfig", kubeconfig, "status", "--namespace", "default"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    assert!(String::from_utf8(output).unwrap().starts_with("NAME"));

    let mut cmd = Command::cargo_bin("capi-events").unwrap();
    cmd.args([
        "--kubeconfig",
        kubeconfig,
        "verify",
        "--namespace",
        "cli-verify",
        "--timeout-secs",
        "5",
    ]);
    cmd.assert().failure();
}
