//! Provider offerings: service types and availability windows.
//!
//! A `ServiceType` is what a provider sells (length and price of one
//! session). An `Availability` is a window of time the provider opens for
//! one service type; publishing it cuts the window into `available`
//! session slots.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AvailabilityId, Authorizable, ProviderId, ServiceTypeId, Timestamp, ValidationError,
};
use crate::domain::session::{NewSlot, SessionType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: ServiceTypeId,
    pub provider_id: ProviderId,
    pub name: String,
    pub session_type: SessionType,
    pub duration_minutes: u32,
    pub price_cents: i64,
}

impl ServiceType {
    pub fn new(
        provider_id: ProviderId,
        name: impl Into<String>,
        session_type: SessionType,
        duration_minutes: u32,
        price_cents: i64,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if duration_minutes == 0 || duration_minutes > 24 * 60 {
            return Err(ValidationError::out_of_range(
                "duration_minutes",
                1,
                24 * 60,
                i64::from(duration_minutes),
            ));
        }
        if price_cents < 0 {
            return Err(ValidationError::out_of_range("price_cents", 0, i64::MAX, price_cents));
        }
        Ok(Self {
            id: ServiceTypeId::new(),
            provider_id,
            name,
            session_type,
            duration_minutes,
            price_cents,
        })
    }
}

impl Authorizable for ServiceType {
    const RESOURCE_TYPE: &'static str = "ServiceType";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

/// A window of time a provider opens for one service type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub id: AvailabilityId,
    pub provider_id: ProviderId,
    pub service_type_id: ServiceTypeId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

impl Availability {
    pub fn new(
        provider_id: ProviderId,
        service_type_id: ServiceTypeId,
        starts_at: Timestamp,
        ends_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if !ends_at.is_after(&starts_at) {
            return Err(ValidationError::invariant("availability must end after it starts"));
        }
        Ok(Self {
            id: AvailabilityId::new(),
            provider_id,
            service_type_id,
            starts_at,
            ends_at,
        })
    }

    /// Cuts the window into back-to-back slots of the service's length.
    ///
    /// A trailing remainder shorter than one session is dropped.
    pub fn slots(&self, service: &ServiceType) -> Result<Vec<NewSlot>, ValidationError> {
        if service.id != self.service_type_id {
            return Err(ValidationError::invariant(
                "availability belongs to a different service type",
            ));
        }
        if service.provider_id != self.provider_id {
            return Err(ValidationError::invariant(
                "service type belongs to a different provider",
            ));
        }

        let step = i64::from(service.duration_minutes);
        let mut slots = Vec::new();
        let mut start = self.starts_at;
        loop {
            let end = start.plus_minutes(step);
            if end.is_after(&self.ends_at) {
                break;
            }
            slots.push(NewSlot {
                provider_id: self.provider_id.clone(),
                service_type_id: Some(service.id),
                availability_id: Some(self.id),
                session_type: service.session_type,
                subject: None,
                grade_level: None,
                start,
                end,
                price_cents: service.price_cents,
            });
            start = end;
        }
        Ok(slots)
    }
}

impl Authorizable for Availability {
    const RESOURCE_TYPE: &'static str = "Availability";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}
