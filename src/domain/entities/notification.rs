//! Wire-level refresh notification and its decoder.

use serde::Deserialize;

use crate::domain::entities::LinkId;
use crate::error::AppError;

/// Raw queue payload: `{"id":"<24-hex identifier>"}`.
#[derive(Debug, Deserialize)]
struct WirePayload {
    id: String,
}

/// A decoded, validated request to refresh one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkNotification {
    pub id: LinkId,
}

impl LinkNotification {
    /// Decodes a delivered payload.
    ///
    /// Pure; performs no I/O. Fails with [`AppError::Decode`] when the payload
    /// is not well-formed JSON or the identifier does not parse as a
    /// [`LinkId`].
    pub fn decode(payload: &[u8]) -> Result<Self, AppError> {
        let wire: WirePayload = serde_json::from_slice(payload)
            .map_err(|e| AppError::decode(format!("invalid payload: {e}")))?;

        let id = wire
            .id
            .parse::<LinkId>()
            .map_err(|e| AppError::decode(format!("invalid id {:?}: {e}", wire.id)))?;

        Ok(Self { id })
    }
}
