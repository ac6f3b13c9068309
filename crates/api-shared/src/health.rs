use crate::dto::HealthRes;

/// Simple health service used by the REST API.
#[derive(Clone, Copy, Debug)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "ZahaniFlow is alive".into(),
        }
    }
}
