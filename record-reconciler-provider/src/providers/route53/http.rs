//! Route 53 signed request helpers

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::sign::{SigningRequest, canonical_query_string};
use super::types::{ErrorResponse, InvalidChangeBatchResponse};
use super::{API_VERSION, Route53Provider};

impl Route53Provider {
    // ==================== Helpers ====================

    /// Map a non-2xx response onto a [`ProviderError`](crate::ProviderError).
    fn handle_response_error(
        &self,
        status: u16,
        response_text: &str,
        ctx: ErrorContext,
    ) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        if let Ok(error) = quick_xml::de::from_str::<ErrorResponse>(response_text) {
            log::debug!(
                "[{}] API error {} (request id {})",
                self.provider_name(),
                error.error.code,
                error.request_id.as_deref().unwrap_or("-")
            );
            return Err(self.map_error(
                RawApiError::with_code(error.error.code, error.error.message.unwrap_or_default()),
                ctx,
            ));
        }

        if let Some(messages) = quick_xml::de::from_str::<InvalidChangeBatchResponse>(response_text)
            .ok()
            .and_then(InvalidChangeBatchResponse::joined)
        {
            return Err(self.map_error(
                RawApiError::with_code("InvalidChangeBatch", messages),
                ctx,
            ));
        }

        Err(self.unknown_error(RawApiError::new(format!(
            "HTTP {status}: {}",
            truncate_for_log(response_text)
        ))))
    }

    /// Headers every request signs: host, date and (if present) the session token.
    fn base_headers(&self, amz_date: &str) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Host".to_string(), self.host.clone()),
            ("X-Amz-Date".to_string(), amz_date.to_string()),
        ];
        if let Some(token) = &self.session_token {
            headers.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        headers
    }

    fn api_path(path: &str) -> String {
        format!("/{API_VERSION}/{path}")
    }

    // ==================== Public helpers ====================

    /// Signed GET; `path` is relative to the API version, e.g. `hostedzone/Z1`.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        ctx: ErrorContext,
    ) -> Result<T> {
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let path = Self::api_path(path);
        let headers = self.base_headers(&amz_date);

        let authorization = self.sign(&SigningRequest {
            method: "GET",
            path: &path,
            query,
            headers: &headers,
            payload: "",
            amz_date: &amz_date,
        });

        let query_string = canonical_query_string(query);
        let url = if query_string.is_empty() {
            format!("https://{}{path}", self.host)
        } else {
            format!("https://{}{path}?{query_string}", self.host)
        };

        let mut request = self.client.get(&url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request.header("Authorization", authorization);

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "GET",
            &url,
            self.max_retries,
        )
        .await?;

        self.handle_response_error(status, &response_text, ctx)?;
        HttpUtils::parse_xml(&response_text, self.provider_name())
    }

    /// Signed POST with an XML body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        let payload = HttpUtils::to_xml(body, self.provider_name())?;
        log::debug!("Request Body: {}", truncate_for_log(&payload));

        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let path = Self::api_path(path);
        let mut headers = self.base_headers(&amz_date);
        headers.push(("Content-Type".to_string(), "text/xml".to_string()));

        let authorization = self.sign(&SigningRequest {
            method: "POST",
            path: &path,
            query: &[],
            headers: &headers,
            payload: &payload,
            amz_date: &amz_date,
        });

        let url = format!("https://{}{path}", self.host);

        let mut request = self.client.post(&url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request
            .header("Authorization", authorization)
            .body(payload);

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "POST",
            &url,
            self.max_retries,
        )
        .await?;

        self.handle_response_error(status, &response_text, ctx)?;
        HttpUtils::parse_xml(&response_text, self.provider_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    fn provider() -> Route53Provider {
        Route53Provider::new("ak".to_string(), "sk".to_string(), Some("tok".to_string()))
    }

    #[test]
    fn success_status_passes() {
        assert!(
            provider()
                .handle_response_error(200, "", ErrorContext::default())
                .is_ok()
        );
    }

    #[test]
    fn error_response_is_mapped() {
        let body = r#"<ErrorResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <Error><Type>Sender</Type><Code>NoSuchHostedZone</Code><Message>nope</Message></Error>
  <RequestId>r-1</RequestId>
</ErrorResponse>"#;
        let result = provider().handle_response_error(
            404,
            body,
            ErrorContext {
                zone_id: Some("Z1".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(ProviderError::ZoneNotFound { zone_id, .. }) if zone_id == "Z1"
        ));
    }

    #[test]
    fn invalid_change_batch_body_is_mapped() {
        let body = r#"<InvalidChangeBatch xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <Messages><Message>RRSet of type CNAME with DNS name www.example.com. is not permitted</Message></Messages>
</InvalidChangeBatch>"#;
        let result = provider().handle_response_error(400, body, ErrorContext::default());
        assert!(matches!(
            result,
            Err(ProviderError::InvalidChangeBatch { raw_message, .. })
                if raw_message.contains("is not permitted")
        ));
    }

    #[test]
    fn unparseable_body_is_unknown() {
        let result = provider().handle_response_error(500, "oops", ErrorContext::default());
        assert!(matches!(
            result,
            Err(ProviderError::Unknown { raw_message, .. }) if raw_message == "HTTP 500: oops"
        ));
    }

    #[test]
    fn session_token_is_signed() {
        let headers = provider().base_headers("20240101T000000Z");
        assert!(
            headers
                .iter()
                .any(|(k, v)| k == "X-Amz-Security-Token" && v == "tok")
        );
    }

    #[test]
    fn api_path_is_versioned() {
        assert_eq!(
            Route53Provider::api_path("hostedzone/Z1/rrset"),
            "/2013-04-01/hostedzone/Z1/rrset"
        );
    }
}
