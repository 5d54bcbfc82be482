//! Response envelope shared by every JSON handler.

use serde::Serialize;

/// `{ "data": T }` envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: job }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
