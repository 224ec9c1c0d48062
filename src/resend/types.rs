//! Tipos de dados para o endpoint `POST /emails` da API Resend.
//!
//! As structs derivam `Serialize` e `Deserialize` para conversão JSON no
//! formato esperado pela Resend. Campos opcionais ausentes não são enviados.

use serde::{Deserialize, Serialize};

/// Parâmetros de um email a ser enviado.
///
/// `from` é opcional aqui: quando ausente, o cliente usa o remetente padrão
/// configurado.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailOptions {
    /// Destinatário principal.
    pub to: String,
    /// Linha de assunto já renderizada.
    pub subject: String,
    /// Corpo HTML já renderizado.
    pub html: String,
    /// Remetente (ex.: "Invoices <invoices@example.com>").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Endereço para respostas. Serializado como `reply_to`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
}

/// Corpo da requisição enviado à Resend, com o remetente já resolvido.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendEmailRequest<'a> {
    pub from: &'a str,
    pub to: [&'a str; 1],
    pub subject: &'a str,
    pub html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub cc: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub bcc: &'a [String],
}

/// Resposta de sucesso da Resend: o identificador do email aceito.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub id: String,
}

/// Corpo de erro retornado pela Resend em respostas 4xx/5xx.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_empty_optionals() {
        let req = SendEmailRequest {
            from: "invoices@example.com",
            to: ["client@example.com"],
            subject: "Hello",
            html: "<p>Hi</p>",
            reply_to: None,
            cc: &[],
            bcc: &[],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["to"][0], "client@example.com");
        assert!(json.get("reply_to").is_none());
        assert!(json.get("cc").is_none());
        assert!(json.get("bcc").is_none());
    }

    #[test]
    fn request_includes_reply_to_and_copies() {
        let cc = vec!["a@example.com".to_string()];
        let req = SendEmailRequest {
            from: "invoices@example.com",
            to: ["client@example.com"],
            subject: "Hello",
            html: "<p>Hi</p>",
            reply_to: Some("me@example.com"),
            cc: &cc,
            bcc: &[],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["reply_to"], "me@example.com");
        assert_eq!(json["cc"][0], "a@example.com");
    }

    #[test]
    fn response_deserialize_from_api_format() {
        let resp: SendEmailResponse =
            serde_json::from_str(r#"{"id":"49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"}"#).unwrap();
        assert_eq!(resp.id, "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794");
    }

    #[test]
    fn error_body_tolerates_extra_fields() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"statusCode":422,"message":"Invalid `to` field","name":"validation_error"}"#,
        )
        .unwrap();
        assert_eq!(body.message, "Invalid `to` field");
    }
}
