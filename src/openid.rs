//! OpenID 2.0 relying-party client for a fixed provider endpoint.
//!
//! No discovery and no associations: the host configures the OP endpoint and
//! every assertion is confirmed with a stateless `check_authentication`
//! request, which leaves signature checking and nonce replay detection to the
//! provider.

use std::collections::HashMap;

use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use url::Url;

use crate::error::{Error, ProviderError};
use crate::identity::VerifiedIdentity;
use crate::provider::{CallbackParams, IdentityProvider, RedirectInstruction};

const OPENID2_NS: &str = "http://specs.openid.net/auth/2.0";
const SREG_NS: &str = "http://openid.net/extensions/sreg/1.1";
const SREG_NS_LEGACY: &str = "http://openid.net/sreg/1.0";
const AX_NS: &str = "http://openid.net/srv/ax/1.0";

const AX_NICKNAME: &str = "http://axschema.org/namePerson/friendly";
const AX_FULL_NAME: &str = "http://axschema.org/namePerson";
const AX_EMAIL: &str = "http://axschema.org/contact/email";

/// Fields a positive assertion must sign.
const REQUIRED_SIGNED: [&str; 6] = [
    "op_endpoint",
    "return_to",
    "response_nonce",
    "assoc_handle",
    "claimed_id",
    "identity",
];

/// OpenID provider configuration.
///
/// ```rust,ignore
/// let config = OpenIdConfig::new(
///     "https://openid.example.com/server".parse()?,
///     "https://ci.example.com/".parse()?,
/// );
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OpenIdConfig {
    pub(crate) endpoint: Url,
    pub(crate) realm: Url,
    pub(crate) nonce_max_age: Duration,
}

impl OpenIdConfig {
    /// Create a configuration for the OP at `endpoint`, trusting `realm`.
    #[must_use]
    pub fn new(endpoint: Url, realm: Url) -> Self {
        Self {
            endpoint,
            realm,
            nonce_max_age: Duration::seconds(5000),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `OPENID_ENDPOINT`: OP endpoint URL
    /// - `OPENID_REALM`: realm (root URL of this application)
    ///
    /// # Optional env vars
    /// - `OPENID_NONCE_MAX_AGE_SECS`: accepted `response_nonce` age (default 5000)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let url = |name: &str| -> Result<Url, Error> {
            var(name)
                .ok_or_else(|| Error::Config(format!("{name} is required")))?
                .parse()
                .map_err(|e| Error::Config(format!("{name}: {e}")))
        };
        let mut config = Self::new(url("OPENID_ENDPOINT")?, url("OPENID_REALM")?);

        if let Some(secs) = var("OPENID_NONCE_MAX_AGE_SECS") {
            let secs: i64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("OPENID_NONCE_MAX_AGE_SECS: {e}")))?;
            if secs <= 0 {
                return Err(Error::Config(
                    "OPENID_NONCE_MAX_AGE_SECS must be a positive number of seconds".into(),
                ));
            }
            config = config.with_nonce_max_age(Duration::seconds(secs));
        }
        Ok(config)
    }

    /// Override how old a `response_nonce` may be (default 5000 seconds).
    #[must_use]
    pub fn with_nonce_max_age(mut self, max_age: Duration) -> Self {
        self.nonce_max_age = max_age;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn realm(&self) -> &Url {
        &self.realm
    }
}

/// [`IdentityProvider`] speaking OpenID 2.0 to a single configured OP.
pub struct OpenIdProvider {
    config: OpenIdConfig,
    http: reqwest::Client,
}

impl OpenIdProvider {
    #[must_use]
    pub fn new(config: OpenIdConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &OpenIdConfig {
        &self.config
    }

    /// Ask the OP to confirm the assertion it signed.
    async fn check_authentication(&self, params: &CallbackParams) -> Result<(), ProviderError> {
        let form: Vec<(&str, &str)> = params
            .iter()
            .filter(|(k, _)| k.starts_with("openid."))
            .map(|(k, v)| match k {
                "openid.mode" => (k, "check_authentication"),
                _ => (k, v),
            })
            .collect();

        let response = self
            .http
            .post(self.config.endpoint.clone())
            .form(&form)
            .send()
            .await?;

        let response = Self::ensure_success(response, "check_authentication").await?;
        let body = response.text().await?;
        let fields = parse_key_value(&body);

        if let Some(handle) = fields.get("invalidate_handle") {
            tracing::debug!(handle = %handle, "OP invalidated association handle");
        }

        if fields.get("is_valid").copied() != Some("true") {
            return Err(ProviderError::Rejected {
                operation: "check_authentication",
                detail: "provider did not confirm the assertion".into(),
            });
        }
        Ok(())
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, ProviderError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::Rejected {
            operation,
            detail: format!("HTTP {status}: {body}"),
        })
    }
}

impl IdentityProvider for OpenIdProvider {
    async fn begin_authentication(
        &self,
        identifier: &str,
        return_to: &Url,
    ) -> Result<RedirectInstruction, ProviderError> {
        let claimed_id = normalize_identifier(identifier)?;

        if !within_realm(&self.config.realm, return_to) {
            return Err(ProviderError::Malformed(format!(
                "return_to {return_to} is outside realm {}",
                self.config.realm
            )));
        }

        let mut url = self.config.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("openid.ns", OPENID2_NS)
            .append_pair("openid.mode", "checkid_setup")
            .append_pair("openid.claimed_id", claimed_id.as_str())
            .append_pair("openid.identity", claimed_id.as_str())
            .append_pair("openid.return_to", return_to.as_str())
            .append_pair("openid.realm", self.config.realm.as_str())
            .append_pair("openid.ns.sreg", SREG_NS)
            .append_pair("openid.sreg.optional", "nickname,fullname,email")
            .append_pair("openid.ns.ax", AX_NS)
            .append_pair("openid.ax.mode", "fetch_request")
            .append_pair("openid.ax.type.nickname", AX_NICKNAME)
            .append_pair("openid.ax.type.fullname", AX_FULL_NAME)
            .append_pair("openid.ax.type.email", AX_EMAIL)
            .append_pair("openid.ax.if_available", "nickname,fullname,email");

        Ok(RedirectInstruction::new(url))
    }

    async fn complete_authentication(
        &self,
        return_to: &Url,
        response: &CallbackParams,
    ) -> Result<VerifiedIdentity, ProviderError> {
        match response.get("openid.mode") {
            Some("id_res") => {}
            Some("cancel") => return Err(ProviderError::Cancelled),
            Some("error") => {
                return Err(ProviderError::Rejected {
                    operation: "checkid_setup",
                    detail: response
                        .get("openid.error")
                        .unwrap_or("unspecified error")
                        .to_string(),
                });
            }
            Some(other) => {
                return Err(ProviderError::Malformed(format!(
                    "unexpected openid.mode {other}"
                )));
            }
            None => return Err(ProviderError::Malformed("missing openid.mode".into())),
        }

        if response.get("openid.ns") != Some(OPENID2_NS) {
            return Err(ProviderError::Malformed("not an OpenID 2.0 response".into()));
        }

        verify_return_to(return_to, required(response, "return_to")?, response)?;

        if !same_endpoint(&self.config.endpoint, required(response, "op_endpoint")?) {
            return Err(ProviderError::Rejected {
                operation: "id_res",
                detail: "assertion issued by an unexpected endpoint".into(),
            });
        }

        check_nonce(
            required(response, "response_nonce")?,
            OffsetDateTime::now_utc(),
            self.config.nonce_max_age,
        )?;

        let signed: Vec<&str> = required(response, "signed")?.split(',').collect();
        if let Some(missing) = REQUIRED_SIGNED.iter().find(|f| !signed.contains(*f)) {
            return Err(ProviderError::Malformed(format!("openid.{missing} is not signed")));
        }

        let claimed_id = required(response, "claimed_id")?;

        self.check_authentication(response).await?;

        let attributes = Attributes {
            params: response,
            signed: &signed,
        };
        let mut identity = VerifiedIdentity::new(claimed_id);
        identity.nickname = attributes.lookup("nickname", AX_NICKNAME);
        identity.full_name = attributes.lookup("fullname", AX_FULL_NAME);
        identity.email = attributes.lookup("email", AX_EMAIL);

        tracing::debug!(claimed_id = %claimed_id, "OpenID assertion verified");
        Ok(identity)
    }
}

/// Normalize a user-supplied identifier into a claimed identifier URL.
fn normalize_identifier(identifier: &str) -> Result<Url, ProviderError> {
    let id = identifier.trim();
    if id.is_empty() {
        return Err(ProviderError::InvalidIdentifier("identifier is empty".into()));
    }
    if id.starts_with("xri://") || id.starts_with(['=', '@', '+', '$', '!', '(']) {
        return Err(ProviderError::InvalidIdentifier(
            "XRI identifiers are not supported".into(),
        ));
    }

    let candidate = if id.contains("://") {
        id.to_string()
    } else {
        format!("http://{id}")
    };
    let mut url = Url::parse(&candidate)
        .map_err(|e| ProviderError::InvalidIdentifier(format!("{id}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ProviderError::InvalidIdentifier(format!(
            "{id}: only http and https identifiers are supported"
        )));
    }
    url.set_fragment(None);
    Ok(url)
}

fn within_realm(realm: &Url, return_to: &Url) -> bool {
    realm.scheme() == return_to.scheme()
        && realm.host_str() == return_to.host_str()
        && realm.port_or_known_default() == return_to.port_or_known_default()
        && return_to.path().starts_with(realm.path())
}

fn same_endpoint(configured: &Url, asserted: &str) -> bool {
    Url::parse(asserted).is_ok_and(|asserted| asserted == *configured)
}

/// The asserted `return_to` must point at the URL we handed out, and its own
/// query parameters must be present in the request we received.
fn verify_return_to(
    expected: &Url,
    asserted: &str,
    response: &CallbackParams,
) -> Result<(), ProviderError> {
    let asserted = Url::parse(asserted)
        .map_err(|e| ProviderError::Malformed(format!("openid.return_to: {e}")))?;

    let same_target = expected.scheme() == asserted.scheme()
        && expected.host_str() == asserted.host_str()
        && expected.port_or_known_default() == asserted.port_or_known_default()
        && expected.path() == asserted.path();
    if !same_target {
        return Err(ProviderError::Malformed(format!(
            "openid.return_to {asserted} does not match {expected}"
        )));
    }

    for (key, value) in asserted.query_pairs() {
        if response.get(&key) != Some(&*value) {
            return Err(ProviderError::Malformed(format!(
                "return_to parameter {key} missing from response"
            )));
        }
    }
    Ok(())
}

/// Reject nonces whose timestamp falls outside `max_age` of `now`.
fn check_nonce(nonce: &str, now: OffsetDateTime, max_age: Duration) -> Result<(), ProviderError> {
    let stamp = nonce
        .get(..20)
        .ok_or_else(|| ProviderError::Malformed("response_nonce too short".into()))?;
    let issued = PrimitiveDateTime::parse(
        stamp,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
    )
    .map_err(|e| ProviderError::Malformed(format!("response_nonce timestamp: {e}")))?
    .assume_utc();

    let age = now - issued;
    if age.abs() > max_age {
        return Err(ProviderError::Rejected {
            operation: "response_nonce",
            detail: format!("nonce issued at {stamp} is outside the accepted window"),
        });
    }
    Ok(())
}

fn required<'a>(params: &'a CallbackParams, field: &str) -> Result<&'a str, ProviderError> {
    params
        .get(&format!("openid.{field}"))
        .ok_or_else(|| ProviderError::Malformed(format!("missing openid.{field}")))
}

/// Parse an OpenID key-value form body (`key:value` per line).
fn parse_key_value(body: &str) -> HashMap<&str, &str> {
    body.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect()
}

/// Signed SREG / AX attribute lookup over a positive assertion.
struct Attributes<'a> {
    params: &'a CallbackParams,
    signed: &'a [&'a str],
}

impl Attributes<'_> {
    fn lookup(&self, sreg_field: &str, ax_type: &str) -> Option<String> {
        self.sreg(sreg_field)
            .or_else(|| self.ax(ax_type))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn is_signed(&self, field: &str) -> bool {
        self.signed.iter().any(|s| *s == field)
    }

    fn signed_value(&self, field: &str) -> Option<&str> {
        if !self.is_signed(field) {
            return None;
        }
        self.params.get(&format!("openid.{field}"))
    }

    /// Alias of an extension whose `ns.<alias>` declaration is signed.
    fn alias(&self, namespaces: &[&str]) -> Option<&str> {
        self.params.iter().find_map(|(k, v)| {
            let alias = k.strip_prefix("openid.ns.")?;
            (namespaces.contains(&v) && self.is_signed(&format!("ns.{alias}"))).then_some(alias)
        })
    }

    fn sreg(&self, field: &str) -> Option<&str> {
        let alias = self.alias(&[SREG_NS, SREG_NS_LEGACY])?;
        self.signed_value(&format!("{alias}.{field}"))
    }

    fn ax(&self, type_uri: &str) -> Option<&str> {
        let alias = self.alias(&[AX_NS])?;
        let type_prefix = format!("openid.{alias}.type.");
        let name = self.params.iter().find_map(|(k, v)| {
            let name = k.strip_prefix(type_prefix.as_str())?;
            (v == type_uri && self.is_signed(&format!("{alias}.type.{name}"))).then_some(name)
        })?;
        self.signed_value(&format!("{alias}.value.{name}"))
            .or_else(|| self.signed_value(&format!("{alias}.value.{name}.1")))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::format_description;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const RETURN_TO: &str = "https://ci.example.com/openid/finish";

    fn provider(endpoint: &str) -> OpenIdProvider {
        OpenIdProvider::new(OpenIdConfig::new(
            endpoint.parse().unwrap(),
            "https://ci.example.com/".parse().unwrap(),
        ))
    }

    fn now_nonce() -> String {
        let stamp = OffsetDateTime::now_utc()
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
            ))
            .unwrap();
        format!("{stamp}abc123")
    }

    fn assertion(endpoint: &str) -> CallbackParams {
        let nonce = now_nonce();
        [
            ("openid.ns", OPENID2_NS),
            ("openid.mode", "id_res"),
            ("openid.op_endpoint", endpoint),
            ("openid.claimed_id", "https://alice.example.org/"),
            ("openid.identity", "https://alice.example.org/"),
            ("openid.return_to", RETURN_TO),
            ("openid.response_nonce", nonce.as_str()),
            ("openid.assoc_handle", "handle-1"),
            (
                "openid.signed",
                "op_endpoint,claimed_id,identity,return_to,response_nonce,assoc_handle,ns.sreg,sreg.nickname,ns.ext1,ext1.type.mail,ext1.value.mail",
            ),
            ("openid.sig", "c2lnbmF0dXJl"),
            ("openid.ns.sreg", SREG_NS),
            ("openid.sreg.nickname", "alice"),
            ("openid.sreg.fullname", "Alice Unsigned"),
            ("openid.ns.ext1", AX_NS),
            ("openid.ext1.mode", "fetch_response"),
            ("openid.ext1.type.mail", AX_EMAIL),
            ("openid.ext1.value.mail", "alice@example.org"),
        ]
        .into_iter()
        .collect()
    }

    async fn op_answering(body: &str, expected_calls: u64) -> (MockServer, String) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/op"))
            .and(body_string_contains("openid.mode=check_authentication"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .expect(expected_calls)
            .mount(&server)
            .await;
        let endpoint = format!("{}/op", server.uri());
        (server, endpoint)
    }

    fn return_to() -> Url {
        RETURN_TO.parse().unwrap()
    }

    #[test]
    fn normalize_adds_scheme_and_drops_fragment() {
        assert_eq!(
            normalize_identifier(" alice.example.org/me ").unwrap().as_str(),
            "http://alice.example.org/me"
        );
        assert_eq!(
            normalize_identifier("https://alice.example.org/#x").unwrap().as_str(),
            "https://alice.example.org/"
        );
    }

    #[test]
    fn normalize_rejects_unsupported_identifiers() {
        for bad in ["", "   ", "=alice", "xri://=alice", "ftp://files.example.org/", "http://"] {
            assert!(
                matches!(normalize_identifier(bad), Err(ProviderError::InvalidIdentifier(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn begin_builds_checkid_setup_redirect() {
        let provider = provider("https://openid.example.net/server");

        let redirect = provider
            .begin_authentication("alice.example.org", &return_to())
            .await
            .unwrap();

        let query: HashMap<String, String> = redirect.url.query_pairs().into_owned().collect();
        assert_eq!(redirect.url.host_str(), Some("openid.example.net"));
        assert_eq!(query["openid.mode"], "checkid_setup");
        assert_eq!(query["openid.claimed_id"], "http://alice.example.org/");
        assert_eq!(query["openid.return_to"], RETURN_TO);
        assert_eq!(query["openid.realm"], "https://ci.example.com/");
        assert_eq!(query["openid.sreg.optional"], "nickname,fullname,email");
    }

    #[tokio::test]
    async fn begin_rejects_return_to_outside_realm() {
        let provider = provider("https://openid.example.net/server");

        let err = provider
            .begin_authentication("alice.example.org", &"https://other.example.com/cb".parse().unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn complete_verifies_with_provider() {
        let (_server, endpoint) = op_answering("ns:http://specs.openid.net/auth/2.0\nis_valid:true\n", 1).await;

        let identity = provider(&endpoint)
            .complete_authentication(&return_to(), &assertion(&endpoint))
            .await
            .unwrap();

        assert_eq!(identity.identifier.as_str(), "https://alice.example.org/");
        assert_eq!(identity.nickname.as_deref(), Some("alice"));
        assert_eq!(identity.email.as_deref(), Some("alice@example.org"));
        assert_eq!(identity.full_name, None, "unsigned attributes are ignored");
    }

    #[tokio::test]
    async fn complete_rejects_unconfirmed_assertion() {
        let (_server, endpoint) = op_answering("is_valid:false\n", 1).await;

        let err = provider(&endpoint)
            .complete_authentication(&return_to(), &assertion(&endpoint))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Rejected { operation: "check_authentication", .. }));
    }

    #[tokio::test]
    async fn complete_reports_cancel() {
        let mut params = CallbackParams::default();
        params.insert("openid.ns", OPENID2_NS);
        params.insert("openid.mode", "cancel");

        let err = provider("https://openid.example.net/server")
            .complete_authentication(&return_to(), &params)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Cancelled));
    }

    #[tokio::test]
    async fn stale_nonce_is_rejected_before_provider_call() {
        let (_server, endpoint) = op_answering("is_valid:true\n", 0).await;
        let mut params = assertion(&endpoint);
        params.insert("openid.response_nonce", "2005-05-15T17:11:51Zold");

        let err = provider(&endpoint)
            .complete_authentication(&return_to(), &params)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Rejected { operation: "response_nonce", .. }));
    }

    #[tokio::test]
    async fn mismatched_return_to_is_rejected() {
        let (_server, endpoint) = op_answering("is_valid:true\n", 0).await;
        let mut params = assertion(&endpoint);
        params.insert("openid.return_to", "https://ci.example.com/elsewhere");

        let err = provider(&endpoint)
            .complete_authentication(&return_to(), &params)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn assertion_from_other_endpoint_is_rejected() {
        let (_server, endpoint) = op_answering("is_valid:true\n", 0).await;
        let params = assertion("https://rogue.example.net/op");

        let err = provider(&endpoint)
            .complete_authentication(&return_to(), &params)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Rejected { operation: "id_res", .. }));
    }

    #[tokio::test]
    async fn unsigned_required_field_is_rejected() {
        let (_server, endpoint) = op_answering("is_valid:true\n", 0).await;
        let mut params = assertion(&endpoint);
        params.insert("openid.signed", "op_endpoint,claimed_id,identity,return_to");

        let err = provider(&endpoint)
            .complete_authentication(&return_to(), &params)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn attributes_under_unsigned_declarations_are_ignored() {
        let (_server, endpoint) = op_answering("is_valid:true\n", 1).await;
        let mut params = assertion(&endpoint);
        params.insert(
            "openid.signed",
            "op_endpoint,claimed_id,identity,return_to,response_nonce,assoc_handle,sreg.nickname,ns.ext1,ext1.value.mail",
        );

        let identity = provider(&endpoint)
            .complete_authentication(&return_to(), &params)
            .await
            .unwrap();

        assert_eq!(identity.nickname, None, "ns.sreg is not signed");
        assert_eq!(identity.email, None, "ext1.type.mail is not signed");
    }

    #[test]
    fn op_endpoint_is_compared_as_url() {
        let configured: Url = "https://op.example".parse().unwrap();

        assert!(same_endpoint(&configured, "https://op.example"));
        assert!(same_endpoint(&configured, "https://op.example/"));
        assert!(!same_endpoint(&configured, "https://rogue.example/"));
        assert!(!same_endpoint(&configured, "not a url"));
    }

    fn config_from(vars: &[(&str, &str)]) -> Result<OpenIdConfig, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        OpenIdConfig::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn config_reads_env() {
        let config = config_from(&[
            ("OPENID_ENDPOINT", "https://openid.example.net/server"),
            ("OPENID_REALM", "https://ci.example.com/"),
            ("OPENID_NONCE_MAX_AGE_SECS", "600"),
        ])
        .unwrap();

        assert_eq!(config.endpoint().as_str(), "https://openid.example.net/server");
        assert_eq!(config.realm().as_str(), "https://ci.example.com/");
        assert_eq!(config.nonce_max_age, Duration::seconds(600));
    }

    #[test]
    fn config_defaults_nonce_window() {
        let config = config_from(&[
            ("OPENID_ENDPOINT", "https://openid.example.net/server"),
            ("OPENID_REALM", "https://ci.example.com/"),
        ])
        .unwrap();

        assert_eq!(config.nonce_max_age, Duration::seconds(5000));
    }

    #[test]
    fn config_rejects_missing_or_invalid_values() {
        let endpoint = ("OPENID_ENDPOINT", "https://openid.example.net/server");
        let realm = ("OPENID_REALM", "https://ci.example.com/");

        for vars in [
            vec![realm],
            vec![endpoint],
            vec![("OPENID_ENDPOINT", "not a url"), realm],
            vec![endpoint, realm, ("OPENID_NONCE_MAX_AGE_SECS", "0")],
            vec![endpoint, realm, ("OPENID_NONCE_MAX_AGE_SECS", "-5000")],
            vec![endpoint, realm, ("OPENID_NONCE_MAX_AGE_SECS", "soon")],
        ] {
            assert!(
                matches!(config_from(&vars), Err(Error::Config(_))),
                "{vars:?} should be rejected"
            );
        }
    }

    #[test]
    fn nonce_window_is_symmetric() {
        let issued = PrimitiveDateTime::parse(
            "2024-01-01T00:00:00Z",
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
        )
        .unwrap()
        .assume_utc();
        let window = Duration::minutes(5);

        assert!(check_nonce("2024-01-01T00:00:00Zx", issued + Duration::minutes(4), window).is_ok());
        assert!(check_nonce("2024-01-01T00:00:00Zx", issued + Duration::minutes(6), window).is_err());
        assert!(check_nonce("2024-01-01T00:00:00Zx", issued - Duration::minutes(6), window).is_err());
        assert!(check_nonce("garbage", issued, window).is_err());
    }

    #[test]
    fn key_value_body_is_parsed() {
        let fields = parse_key_value("ns:http://specs.openid.net/auth/2.0\nis_valid:true\n");
        assert_eq!(fields.get("is_valid"), Some(&"true"));
        assert_eq!(fields.get("ns"), Some(&"http://specs.openid.net/auth/2.0"));
    }
}
