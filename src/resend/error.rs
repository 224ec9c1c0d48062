//! Tipos de erro para o cliente da API Resend.
//!
//! Define [`ResendError`] com variantes para chave ausente, rate limiting,
//! erros da API e erros de rede. Usa `thiserror` para derivar `Display` e
//! `Error` a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao enviar um email pela API da Resend.
///
/// - [`MissingApiKey`](ResendError::MissingApiKey): nenhuma chave configurada
/// - [`RateLimited`](ResendError::RateLimited): o servidor retornou HTTP 429
/// - [`ApiError`](ResendError::ApiError): qualquer outro erro HTTP (4xx/5xx)
/// - [`NetworkError`](ResendError::NetworkError): falha na camada de rede
#[derive(Debug, Error)]
pub enum ResendError {
    /// A chave `RESEND_API_KEY` não foi configurada; nenhuma requisição é feita.
    #[error("RESEND_API_KEY is not defined")]
    MissingApiKey,

    /// O servidor retornou HTTP 429 (rate limit).
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Erro retornado pela API (ex.: 401 chave inválida, 422 remetente não verificado).
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
