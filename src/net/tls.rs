//! TLS certificate loading for the listener.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

/// Load the PEM certificate chain and key named in the config.
///
/// Missing files are reported by path before rustls gets to see them.
pub async fn load_tls_config(tls: &TlsConfig) -> io::Result<RustlsConfig> {
    for (what, path) in [("certificate", &tls.cert_path), ("private key", &tls.key_path)] {
        if !Path::new(path).exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("TLS {} file not found: {}", what, path),
            ));
        }
    }
    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await
}
