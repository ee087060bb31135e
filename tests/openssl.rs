mod util;

use certbuilder::orchestrator::{IssuanceOutcome, Orchestrator};
use certbuilder::pkcs12::Pkcs12CaLoader;
use certbuilder::provider::RustCryptoProvider;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::x509::X509;

fn common_name(name: &openssl::x509::X509NameRef) -> String {
    name.entries_by_nid(Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .to_string()
        .unwrap()
}

#[test]
fn test_openssl_reads_issued_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let ca_file = util::write_ca_container(dir.path());
    let config = util::esrp_config(dir.path(), ca_file.clone());

    let mut orchestrator =
        Orchestrator::new(RustCryptoProvider::default(), Pkcs12CaLoader, util::FixedPasswords);
    let IssuanceOutcome::Created(artifacts) = orchestrator.create_certificate(&config).unwrap()
    else {
        panic!("creation was cancelled");
    };

    let ca = Pkcs12::from_der(&std::fs::read(&ca_file).unwrap())
        .unwrap()
        .parse2(util::CA_PASSWORD)
        .unwrap();
    let ca_cert = ca.cert.unwrap();

    let leaf = X509::from_der(&std::fs::read(&artifacts.cer).unwrap()).unwrap();
    assert_eq!(leaf.version(), 2, "not an X.509 v3 certificate");
    assert_eq!(common_name(leaf.subject_name()), "esrp1.state.example");
    assert_eq!(common_name(leaf.issuer_name()), "Test PCA");
    assert!(leaf.verify(&ca_cert.public_key().unwrap()).unwrap());

    let uris: Vec<String> = leaf
        .subject_alt_names()
        .unwrap()
        .iter()
        .filter_map(|name| name.uri().map(str::to_string))
        .collect();
    assert_eq!(
        uris,
        vec![
            "urn:nena:uid:ElementId:esrp1.state.example",
            "urn:nena:role:ESRP",
            "urn:nena:role:ECRF",
        ]
    );

    let container = Pkcs12::from_der(&std::fs::read(&artifacts.pfx).unwrap())
        .unwrap()
        .parse2(util::NEW_PASSWORD)
        .unwrap();
    assert_eq!(
        container.cert.unwrap().to_der().unwrap(),
        leaf.to_der().unwrap()
    );
    assert!(container.pkey.unwrap().public_eq(&leaf.public_key().unwrap()));
    assert!(Pkcs12::from_der(&std::fs::read(&artifacts.pfx).unwrap())
        .unwrap()
        .parse2("wrong")
        .is_err());
}

#[test]
fn test_openssl_verifies_self_signed_rsa() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = util::esrp_config(dir.path(), dir.path().join("unused.pfx"));
    config.self_signed = true;
    config.signing_algorithm = certbuilder::config::SigningAlgorithm::Rsa;
    config.file_name_no_extension = "rsa".to_string();

    let mut orchestrator =
        Orchestrator::new(RustCryptoProvider::default(), Pkcs12CaLoader, util::FixedPasswords);
    orchestrator.create_certificate(&config).unwrap();

    let cert = X509::from_der(&std::fs::read(dir.path().join("rsa.cer")).unwrap()).unwrap();
    let key = cert.public_key().unwrap();
    assert_eq!(key.bits(), 2048);
    assert!(cert.verify(&key).unwrap());
    assert_eq!(
        cert.signature_algorithm().object().nid(),
        Nid::SHA256WITHRSAENCRYPTION
    );
}
