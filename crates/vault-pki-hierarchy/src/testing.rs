//! In-memory backend and certificate factories shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rcgen::{
    date_time_ymd, BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType,
    IsCa, KeyPair, SerialNumber,
};
use vault_pki_core::{CertificateEntry, IssuerEntry, PkiBackend, PkiMount, Result, VaultPkiError};

/// A generated CA certificate with its signing key
pub struct TestCa {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl TestCa {
    pub fn pem(&self) -> String {
        self.cert.pem()
    }
}

fn params(cn: &str, serial: u64, ca: bool, years: (i32, i32)) -> CertificateParams {
    let sans = if ca { Vec::new() } else { vec![cn.to_string()] };
    let mut params = CertificateParams::new(sans).unwrap();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    params.distinguished_name = dn;
    params.is_ca = if ca {
        IsCa::Ca(BasicConstraints::Unconstrained)
    } else {
        IsCa::NoCa
    };
    params.not_before = date_time_ymd(years.0, 1, 1);
    params.not_after = date_time_ymd(years.1, 1, 1);
    let bytes: Vec<u8> = serial
        .to_be_bytes()
        .into_iter()
        .skip_while(|b| *b == 0)
        .collect();
    params.serial_number = Some(SerialNumber::from(bytes));
    params
}

pub fn root_ca(cn: &str, serial: u64) -> TestCa {
    let key = KeyPair::generate().unwrap();
    let cert = params(cn, serial, true, (2020, 2090)).self_signed(&key).unwrap();
    TestCa { cert, key }
}

pub fn intermediate_ca(cn: &str, serial: u64, parent: &TestCa) -> TestCa {
    let key = KeyPair::generate().unwrap();
    let cert = params(cn, serial, true, (2020, 2080))
        .signed_by(&key, &parent.cert, &parent.key)
        .unwrap();
    TestCa { cert, key }
}

pub fn leaf_with_validity(cn: &str, serial: u64, parent: &TestCa, years: (i32, i32)) -> String {
    let key = KeyPair::generate().unwrap();
    params(cn, serial, false, years)
        .signed_by(&key, &parent.cert, &parent.key)
        .unwrap()
        .pem()
}

pub fn leaf(cn: &str, serial: u64, parent: &TestCa) -> String {
    leaf_with_validity(cn, serial, parent, (2024, 2070))
}

enum Canned<T> {
    Found(T),
    Forbidden,
}

type ErrorFactory = Box<dyn Fn() -> VaultPkiError + Send + Sync>;

/// A scripted PKI backend that counts the calls it receives
pub struct FakeBackend {
    serials: Vec<String>,
    certificates: HashMap<String, Canned<CertificateEntry>>,
    issuers: HashMap<String, Canned<IssuerEntry>>,
    default_issuer: Option<String>,
    mounts: Canned<Vec<PkiMount>>,
    list_error: Option<ErrorFactory>,
    fetch_delay: Duration,
    slow_serials: HashMap<String, Duration>,
    crashing_serials: Vec<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    certificate_fetches: AtomicUsize,
    issuer_fetches: Mutex<HashMap<String, usize>>,
    default_issuer_reads: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            serials: Vec::new(),
            certificates: HashMap::new(),
            issuers: HashMap::new(),
            default_issuer: None,
            mounts: Canned::Found(vec![PkiMount::new("pki")]),
            list_error: None,
            fetch_delay: Duration::ZERO,
            slow_serials: HashMap::new(),
            crashing_serials: Vec::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            certificate_fetches: AtomicUsize::new(0),
            issuer_fetches: Mutex::new(HashMap::new()),
            default_issuer_reads: AtomicUsize::new(0),
        }
    }

    fn list(&mut self, serial: &str) {
        if !self.serials.iter().any(|s| s == serial) {
            self.serials.push(serial.to_string());
        }
    }

    pub fn with_entry(mut self, serial: &str, entry: CertificateEntry) -> Self {
        self.list(serial);
        self.certificates
            .insert(serial.to_string(), Canned::Found(entry));
        self
    }

    pub fn with_certificate(self, serial: &str, pem: &str, issuer_ref: &str) -> Self {
        self.with_entry(serial, CertificateEntry::from_pem(pem).issuer(issuer_ref))
    }

    pub fn with_forbidden_certificate(mut self, serial: &str) -> Self {
        self.list(serial);
        self.certificates
            .insert(serial.to_string(), Canned::Forbidden);
        self
    }

    /// Listed but gone by the time it is fetched
    pub fn with_vanished_certificate(mut self, serial: &str) -> Self {
        self.list(serial);
        self
    }

    pub fn with_issuer(mut self, issuer_ref: &str, ca: &TestCa, parents: &[&TestCa]) -> Self {
        let ca_chain = std::iter::once(ca)
            .chain(parents.iter().copied())
            .map(TestCa::pem)
            .collect();
        self.issuers.insert(
            issuer_ref.to_string(),
            Canned::Found(IssuerEntry {
                issuer_ref: issuer_ref.to_string(),
                issuer_name: None,
                certificate: Some(ca.pem()),
                ca_chain,
            }),
        );
        self
    }

    pub fn with_forbidden_issuer(mut self, issuer_ref: &str) -> Self {
        self.issuers
            .insert(issuer_ref.to_string(), Canned::Forbidden);
        self
    }

    pub fn with_default_issuer(mut self, issuer_ref: &str) -> Self {
        self.default_issuer = Some(issuer_ref.to_string());
        self
    }

    pub fn with_mounts(mut self, paths: &[&str]) -> Self {
        self.mounts = Canned::Found(paths.iter().map(|p| PkiMount::new(p)).collect());
        self
    }

    pub fn with_forbidden_mounts(mut self) -> Self {
        self.mounts = Canned::Forbidden;
        self
    }

    pub fn with_list_error(
        mut self,
        error: impl Fn() -> VaultPkiError + Send + Sync + 'static,
    ) -> Self {
        self.list_error = Some(Box::new(error));
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn with_slow_serial(mut self, serial: &str, delay: Duration) -> Self {
        self.slow_serials.insert(serial.to_string(), delay);
        self
    }

    /// Listed, but the fetch panics instead of answering
    pub fn with_crashing_certificate(mut self, serial: &str) -> Self {
        self.list(serial);
        self.crashing_serials.push(serial.to_string());
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn certificate_fetches(&self) -> usize {
        self.certificate_fetches.load(Ordering::SeqCst)
    }

    pub fn issuer_fetches(&self, issuer_ref: &str) -> usize {
        self.issuer_fetches
            .lock()
            .unwrap()
            .get(issuer_ref)
            .copied()
            .unwrap_or(0)
    }

    pub fn default_issuer_reads(&self) -> usize {
        self.default_issuer_reads.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }
}

fn forbidden(path: String) -> VaultPkiError {
    VaultPkiError::PermissionDenied {
        path,
        message: "permission denied".into(),
    }
}

#[async_trait]
impl PkiBackend for FakeBackend {
    async fn list_serials(&self, _mount: &str) -> Result<Vec<String>> {
        if let Some(error) = &self.list_error {
            return Err(error());
        }
        Ok(self.serials.clone())
    }

    async fn fetch_certificate(&self, mount: &str, serial: &str) -> Result<CertificateEntry> {
        let _guard = self.enter();
        self.certificate_fetches.fetch_add(1, Ordering::SeqCst);

        let delay = self
            .slow_serials
            .get(serial)
            .copied()
            .unwrap_or(self.fetch_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.crashing_serials.iter().any(|s| s == serial) {
            panic!("backend crashed while reading {mount}/cert/{serial}");
        }

        match self.certificates.get(serial) {
            Some(Canned::Found(entry)) => Ok(entry.clone()),
            Some(Canned::Forbidden) => Err(forbidden(format!("{mount}/cert/{serial}"))),
            None => Err(VaultPkiError::NotFound {
                resource: format!("{mount}/cert/{serial}"),
            }),
        }
    }

    async fn fetch_issuer(&self, mount: &str, issuer_ref: &str) -> Result<IssuerEntry> {
        let _guard = self.enter();
        *self
            .issuer_fetches
            .lock()
            .unwrap()
            .entry(issuer_ref.to_string())
            .or_default() += 1;

        tokio::time::sleep(Duration::from_millis(5)).await;

        match self.issuers.get(issuer_ref) {
            Some(Canned::Found(entry)) => Ok(entry.clone()),
            Some(Canned::Forbidden) => Err(forbidden(format!("{mount}/issuer/{issuer_ref}"))),
            None => Err(VaultPkiError::NotFound {
                resource: format!("{mount}/issuer/{issuer_ref}"),
            }),
        }
    }

    async fn default_issuer(&self, _mount: &str) -> Result<Option<String>> {
        self.default_issuer_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.default_issuer.clone())
    }

    async fn list_pki_mounts(&self) -> Result<Vec<PkiMount>> {
        match &self.mounts {
            Canned::Found(mounts) => Ok(mounts.clone()),
            Canned::Forbidden => Err(forbidden("sys/mounts".into())),
        }
    }
}
