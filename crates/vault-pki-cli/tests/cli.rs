use assert_cmd::Command;
use predicates::prelude::*;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    SerialNumber,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "hvs.cli-test";

/// The binary with an isolated config file and no ambient Vault settings
fn vault_pki(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vault-pki").unwrap();
    cmd.env("VAULT_PKI_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("VAULT_ADDR")
        .env_remove("VAULT_TOKEN")
        .env_remove("VAULT_NAMESPACE")
        .env_remove("VAULT_SKIP_VERIFY")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn connected(config_dir: &TempDir, server: &MockServer) -> Command {
    let mut cmd = vault_pki(config_dir);
    cmd.args(["--addr", &server.uri(), "--token", TOKEN]);
    cmd
}

async fn mount_table(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/sys/mounts"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "pki/": {"type": "pki", "description": "Root CA"},
                "pki_int/": {"type": "pki", "description": "Issuing CA"},
                "secret/": {"type": "kv", "description": "key/value"}
            }
        })))
        .mount(server)
        .await;
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn cert_params(cn: &str, serial: &[u8], ca: bool) -> CertificateParams {
    let mut params = CertificateParams::new(if ca { vec![] } else { vec![cn.to_string()] }).unwrap();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    params.distinguished_name = dn;
    params.is_ca = if ca {
        IsCa::Ca(BasicConstraints::Unconstrained)
    } else {
        IsCa::NoCa
    };
    params.serial_number = Some(SerialNumber::from(serial.to_vec()));
    params
}

/// Root, intermediate and leaf PEMs, the leaf issued by the intermediate
fn issuing_chain() -> (String, String, String) {
    let root_key = KeyPair::generate().unwrap();
    let root: Certificate = cert_params("CLI Test Root", &[0x01], true)
        .self_signed(&root_key)
        .unwrap();
    let int_key = KeyPair::generate().unwrap();
    let int = cert_params("CLI Issuing CA", &[0x02], true)
        .signed_by(&int_key, &root, &root_key)
        .unwrap();
    let leaf_key = KeyPair::generate().unwrap();
    let leaf = cert_params("api.example.com", &[0x1f, 0x2e], false)
        .signed_by(&leaf_key, &int, &int_key)
        .unwrap();
    (root.pem(), int.pem(), leaf.pem())
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    vault_pki(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("engines"))
        .stdout(predicate::str::contains("hierarchy"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn missing_address_explains_how_to_set_it() {
    let dir = TempDir::new().unwrap();
    vault_pki(&dir)
        .args(["hierarchy", "pki"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VAULT_ADDR"));
}

#[test]
fn config_set_is_persisted_and_token_masked() {
    let dir = TempDir::new().unwrap();

    vault_pki(&dir)
        .args(["config", "set", "namespace", "team-a"])
        .assert()
        .success();
    vault_pki(&dir)
        .args(["config", "set", "token", "hvs.supersecretvalue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("supersecret").not());

    let output = vault_pki(&dir)
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown = stdout_json(&output);
    assert_eq!(shown["namespace"], "team-a");
    assert_eq!(shown["token"], "hvs....alue");

    vault_pki(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    vault_pki(&dir)
        .args(["config", "set", "nope", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn engines_lists_only_pki_mounts() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    let dir = TempDir::new().unwrap();

    let output = connected(&dir, &server)
        .args(["engines", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let engines = stdout_json(&output);
    let paths: Vec<&str> = engines
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, ["pki", "pki_int"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn engines_count_lists_each_mount() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/pki/certs"))
        .and(query_param("list", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"keys": ["01", "02"]}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pki_int/certs"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let output = connected(&dir, &server)
        .args(["engines", "--count", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let engines = stdout_json(&output);
    assert_eq!(engines[0]["certificates"], "2");
    assert_eq!(engines[1]["certificates"], "denied");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_mount_lists_nothing() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/pki_int/certs"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"errors": []})))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let output = connected(&dir, &server)
        .args(["list", "pki_int", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let list = stdout_json(&output);
    assert_eq!(list["certificates"], json!([]));
    assert_eq!(list["warnings"], json!([]));

    let output = connected(&dir, &server)
        .args(["hierarchy", "pki_int", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["rootGroups"], json!([]));
    assert_eq!(report["summary"]["totalCertificates"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn hierarchy_places_leaf_under_its_intermediate() {
    let (root_pem, int_pem, leaf_pem) = issuing_chain();
    let server = MockServer::start().await;
    mount_table(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/pki_int/certs"))
        .and(query_param("list", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"keys": ["1f:2e"]}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pki_int/cert/1f:2e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "certificate": leaf_pem,
                "issuer_id": "int-ref",
                "revocation_time": 0
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pki_int/issuer/int-ref"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "issuer_id": "int-ref",
                "issuer_name": "issuing-2024",
                "certificate": int_pem.clone(),
                "ca_chain": [int_pem, root_pem]
            }
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let output = connected(&dir, &server)
        .args(["hierarchy", "pki_int", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = stdout_json(&output);
    let root = &report["rootGroups"][0];
    assert_eq!(root["rootCommonName"], "CLI Test Root");
    assert_eq!(root["directCertificates"], json!([]));
    let int = &root["intermediateGroups"][0];
    assert_eq!(int["intermediateCommonName"], "CLI Issuing CA");
    assert_eq!(int["intermediateIssuerRef"], "int-ref");
    assert_eq!(int["certificates"][0]["serialNumber"], "1f:2e");
    assert_eq!(int["certificates"][0]["subjectCommonName"], "api.example.com");
    assert_eq!(report["summary"]["intermediateCount"], 1);
    assert_eq!(report["warnings"], json!([]));

    connected(&dir, &server)
        .args(["list", "pki_int"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CLI Issuing CA < CLI Test Root"));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_json_keeps_warnings_for_unreadable_certificates() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/pki_int/certs"))
        .and(query_param("list", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"keys": ["01"]}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pki_int/cert/01"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    for format in ["json", "yaml"] {
        let output = connected(&dir, &server)
            .args(["list", "pki_int", "-o", format])
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let list: Value = if format == "json" {
            stdout_json(&output)
        } else {
            serde_yaml::from_slice(&output.stdout).unwrap()
        };

        assert_eq!(list["certificates"], json!([]));
        assert_eq!(list["warnings"][0]["kind"], "permission-denied");
        assert_eq!(list["warnings"][0]["resource"], "01");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_mount_names_the_available_ones() {
    let server = MockServer::start().await;
    mount_table(&server).await;
    let dir = TempDir::new().unwrap();

    connected(&dir, &server)
        .args(["hierarchy", "pki_missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pki_missing"))
        .stderr(predicate::str::contains("pki, pki_int"));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_reports_token_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "display_name": "token-pki-reader",
                "policies": ["default", "pki-read"],
                "ttl": 3600,
                "renewable": true
            }
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let output = connected(&dir, &server)
        .args(["status", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let status = stdout_json(&output);
    assert_eq!(status["token"]["display_name"], "token-pki-reader");
    assert_eq!(status["token"]["policies"], json!(["default", "pki-read"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_token_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    connected(&dir, &server)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("permission denied"));
}
