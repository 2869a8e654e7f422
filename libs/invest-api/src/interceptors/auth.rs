use tonic::metadata::{Ascii, MetadataValue};
use tonic::{Request, Status};

use crate::error::{InvestApiError, InvestApiResult};

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const APP_NAME_HEADER: &str = "x-app-name";

/// Per-call credentials for the Invest API
///
/// Injects `authorization: Bearer <token>` and `x-app-name: <name>` into every
/// outgoing request. Both values are validated once when the interceptor is
/// built, so `call` never fails and never blocks.
///
/// # Example
/// ```ignore
/// use invest_api::interceptors::InvestApiCredentials;
///
/// let credentials = InvestApiCredentials::new("t.my-token", "my-robot")?;
/// let service = InterceptedService::new(transport, credentials);
/// ```
#[derive(Clone)]
pub struct InvestApiCredentials {
    authorization: MetadataValue<Ascii>,
    app_name_value: MetadataValue<Ascii>,
    app_name: String,
}

impl InvestApiCredentials {
    pub fn new(access_token: &str, app_name: &str) -> InvestApiResult<Self> {
        let authorization =
            ascii_metadata(&format!("Bearer {}", access_token), AUTHORIZATION_HEADER)?;
        let app_name_value = ascii_metadata(app_name, APP_NAME_HEADER)?;

        Ok(Self {
            authorization,
            app_name_value,
            app_name: app_name.to_string(),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}

/// Parse a metadata value, accepting only printable ASCII and spaces
///
/// `MetadataValue::from_str` lets bytes >= 0x80 through, so check first.
fn ascii_metadata(value: &str, header: &'static str) -> InvestApiResult<MetadataValue<Ascii>> {
    if !value.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
        return Err(InvestApiError::InvalidHeader { header });
    }

    value
        .parse()
        .map_err(|_| InvestApiError::InvalidHeader { header })
}

impl std::fmt::Debug for InvestApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestApiCredentials")
            .field("authorization", &"Bearer <redacted>")
            .field("app_name", &self.app_name)
            .finish()
    }
}

impl tonic::service::Interceptor for InvestApiCredentials {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let metadata = request.metadata_mut();
        metadata.insert(AUTHORIZATION_HEADER, self.authorization.clone());
        metadata.insert(APP_NAME_HEADER, self.app_name_value.clone());

        tracing::trace!(
            target: "invest_api",
            app_name = %self.app_name,
            "Attached Invest API credentials"
        );

        Ok(request)
    }
}
