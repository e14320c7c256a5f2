pub mod datetime;
pub mod http;

/// reqwest 的 rustls 後端需要一個已安裝的 CryptoProvider
pub fn ensure_rustls_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}
