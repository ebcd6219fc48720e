#![allow(missing_docs)]

use assert_cmd::Command;
use predicates::str;

#[test]
fn help() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--help"])
        .assert()
        .success()
        .stdout(str::contains("Usage: fktable read"))
        .stdout(str::contains("--get <TAG>"))
        .stdout(str::contains("Show the active flavours"));
}

#[test]
fn info() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--info", "data/TOYDIS.dat"])
        .assert()
        .success()
        .stdout(str::contains("TOYDIS"))
        .stdout(str::contains("Toy DIS structure function"))
        .stdout(str::contains("DIS"))
        .stdout(str::contains("datapoints"));
}

#[test]
fn dis_flavours() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--flavours", "data/TOYDIS.dat"])
        .assert()
        .success()
        .stdout(str::contains("Sigma"))
        .stdout(str::contains("100"))
        .stdout(str::contains("200"));
}

#[test]
fn hadronic_flavours_from_compressed_file() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--flavours", "data/TOYHAD.dat.gz"])
        .assert()
        .success()
        .stdout(str::contains("flavour2"))
        .stdout(str::contains("Sigma"))
        .stdout(str::contains("21"));
}

#[test]
fn xgrid() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--xgrid", "data/TOYDIS.dat"])
        .assert()
        .success()
        .stdout(str::contains("1e-5"))
        .stdout(str::contains("5e-1"));
}

#[test]
fn get_key_value_tag() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--get", "GridInfo/NDATA", "data/TOYHAD.dat.gz"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn get_blob() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--get", "GridDesc", "data/TOYDIS.dat"])
        .assert()
        .success()
        .stdout("Toy DIS structure function\n");
}

#[test]
fn get_unknown_section() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--get", "PlotInfo/KEY", "data/TOYDIS.dat"])
        .assert()
        .failure()
        .stderr("Error: unknown section `PlotInfo`\n");
}

#[test]
fn get_missing_tag() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--get", "TheoryInfo/ALPHAS", "data/TOYDIS.dat"])
        .assert()
        .failure()
        .stderr("Error: tag `TheoryInfo/ALPHAS` not found\n");
}

#[test]
fn show() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--show", "data/TOYDIS.dat"])
        .assert()
        .success()
        .stdout(str::contains("_VersionInfo________"))
        .stdout(str::contains("*CODE: toy"))
        .stdout(str::contains("*PTO: 1"))
        .stdout(str::ends_with(
            "{FastKernel_________________________________________________\n",
        ));
}

#[test]
fn missing_file() {
    Command::cargo_bin("fktable")
        .unwrap()
        .args(["read", "--info", "data/MISSING.dat"])
        .assert()
        .failure()
        .stderr(str::starts_with("Error: unable to read FK table `data/MISSING.dat`"));
}
