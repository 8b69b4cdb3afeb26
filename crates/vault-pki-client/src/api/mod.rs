//! API endpoint modules.

mod pki;
mod sys;
mod token;

pub use pki::{CertificateData, IssuerData, IssuersConfig, PkiApi};
pub use sys::SysApi;
pub use token::{TokenApi, TokenInfo};
