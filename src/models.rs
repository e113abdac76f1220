//! The documents the admin tools read and write, with their exact wire field
//! names. Everything here is a flat Firestore document; the structs only
//! exist so the binaries and tests agree on field names and defaults.

use chrono::{DateTime, Utc};

use crate::firestore::value::{FieldValue, Fields};

/// Collection names used across the application.
pub mod collections {
    /// Pre-migration driver records, keyed by the driver's email address.
    pub const LEGACY_DRIVERS: &str = "Drivers";
    /// Central user registry of the unified schema, keyed by auth uid.
    pub const USERS: &str = "users";
    /// Driver-specific data of the unified schema, keyed by auth uid.
    pub const DRIVERS: &str = "drivers";
    /// Rider-specific data of the unified schema, keyed by auth uid.
    pub const USER_PROFILES: &str = "userProfiles";
    /// Active ride requests.
    pub const RIDE_REQUESTS: &str = "rideRequests";
    /// Completed rides.
    pub const RIDE_HISTORY: &str = "rideHistory";
}

/// The discriminant the rest of the application uses to route an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Driver,
    User,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::User => "user",
        }
    }

    /// Anything that isn't explicitly a driver is treated as a regular user,
    /// which is also the fallback for documents missing the field.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("driver") => Self::Driver,
            _ => Self::User,
        }
    }
}

impl From<UserType> for FieldValue {
    fn from(value: UserType) -> Self {
        FieldValue::String(value.as_str().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for FieldValue {
    fn from(point: GeoPoint) -> Self {
        FieldValue::Map(
            Fields::new()
                .with("latitude", point.latitude)
                .with("longitude", point.longitude),
        )
    }
}

impl GeoPoint {
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        let FieldValue::Map(fields) = value else {
            return None;
        };

        Some(Self {
            latitude: fields.double("latitude")?,
            longitude: fields.double("longitude")?,
        })
    }
}

/// A record from the legacy `Drivers` collection, keyed by email.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDriver {
    pub email: String,
    pub name: String,
    pub car_name: String,
    pub car_plate_num: String,
    pub car_type: String,
    pub driver_status: String,
    pub rate: f64,
    /// The `driverLoc` map, carried verbatim when present. The app stores a
    /// `geopoint` entry inside it.
    pub driver_loc: Option<FieldValue>,
}

impl LegacyDriver {
    /// Reads a legacy record, applying the defaults the documents have always
    /// been read with: missing car data becomes empty strings, a missing
    /// status means the driver is offline, and the rate multiplier falls back
    /// to the standard 3.0.
    pub fn from_fields(email: impl Into<String>, fields: &Fields) -> Self {
        Self {
            email: email.into(),
            name: fields.str("name").unwrap_or("Driver").to_string(),
            car_name: fields.str("Car Name").unwrap_or_default().to_string(),
            car_plate_num: fields.str("Car Plate Num").unwrap_or_default().to_string(),
            car_type: fields.str("Car Type").unwrap_or("Car").to_string(),
            driver_status: fields.str("driverStatus").unwrap_or("Offline").to_string(),
            rate: fields.double("rate").unwrap_or(3.0),
            driver_loc: fields.get("driverLoc").cloned(),
        }
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new()
            .with("Car Name", self.car_name.as_str())
            .with("Car Plate Num", self.car_plate_num.as_str())
            .with("Car Type", self.car_type.as_str())
            .with("name", self.name.as_str())
            .with("email", self.email.as_str())
            .with("driverStatus", self.driver_status.as_str())
            .with("rate", self.rate);

        if let Some(loc) = &self.driver_loc {
            fields.insert("driverLoc", loc.clone());
        }

        fields
    }

    /// The geo point buried in the `driverLoc` map, if the record has one.
    pub fn location(&self) -> Option<GeoPoint> {
        let FieldValue::Map(loc) = self.driver_loc.as_ref()? else {
            return None;
        };
        GeoPoint::from_value(loc.get("geopoint")?)
    }
}

/// A document in the central `users` registry.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDoc {
    pub email: String,
    pub name: String,
    pub user_type: UserType,
    pub phone_number: String,
    pub is_active: bool,
    pub fcm_token: String,
    pub profile_image_url: String,
}

impl UserDoc {
    /// A freshly migrated driver account with defaulted contact fields.
    pub fn driver(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            user_type: UserType::Driver,
            phone_number: String::new(),
            is_active: true,
            fcm_token: String::new(),
            profile_image_url: String::new(),
        }
    }

    /// The document to create for a new account. `createdAt` and `lastLogin`
    /// are assigned by the server when the write commits.
    pub fn to_fields(&self) -> Fields {
        Fields::new()
            .with("email", self.email.as_str())
            .with("name", self.name.as_str())
            .with("userType", self.user_type)
            .with("phoneNumber", self.phone_number.as_str())
            .with("createdAt", FieldValue::ServerTimestamp)
            .with("lastLogin", FieldValue::ServerTimestamp)
            .with("isActive", self.is_active)
            .with("fcmToken", self.fcm_token.as_str())
            .with("profileImageUrl", self.profile_image_url.as_str())
    }
}

/// A document in the unified `drivers` collection, keyed by auth uid.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverDoc {
    pub car_name: String,
    pub car_plate_num: String,
    pub car_type: String,
    pub rate: f64,
    pub driver_status: String,
    pub rating: f64,
    pub total_rides: i64,
    pub earnings: f64,
    pub license_number: String,
    pub vehicle_registration: String,
    pub is_verified: bool,
    pub driver_loc: Option<FieldValue>,
}

impl DriverDoc {
    /// Maps a legacy record into the unified schema. Activity fields start at
    /// their defaults: a fresh 5.0 rating, no rides, no earnings, and an
    /// unverified license.
    pub fn from_legacy(legacy: &LegacyDriver) -> Self {
        Self {
            car_name: legacy.car_name.clone(),
            car_plate_num: legacy.car_plate_num.clone(),
            car_type: legacy.car_type.clone(),
            rate: legacy.rate,
            driver_status: legacy.driver_status.clone(),
            rating: 5.0,
            total_rides: 0,
            earnings: 0.0,
            license_number: String::new(),
            vehicle_registration: String::new(),
            is_verified: false,
            driver_loc: legacy.driver_loc.clone(),
        }
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new()
            .with("carName", self.car_name.as_str())
            .with("carPlateNum", self.car_plate_num.as_str())
            .with("carType", self.car_type.as_str())
            .with("rate", self.rate)
            .with("driverStatus", self.driver_status.as_str())
            .with("rating", self.rating)
            .with("totalRides", self.total_rides)
            .with("earnings", self.earnings)
            .with("licenseNumber", self.license_number.as_str())
            .with("vehicleRegistration", self.vehicle_registration.as_str())
            .with("isVerified", self.is_verified);

        if let Some(loc) = &self.driver_loc {
            fields.insert("driverLoc", loc.clone());
        }

        fields
    }
}

/// A document in the `userProfiles` collection for a regular rider.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub home_address: String,
    pub work_address: String,
    pub favorite_locations: Vec<FieldValue>,
    pub payment_methods: Vec<FieldValue>,
    pub notifications: bool,
    pub language: String,
    pub theme: String,
    pub total_rides: i64,
    pub rating: f64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            home_address: String::new(),
            work_address: String::new(),
            favorite_locations: Vec::new(),
            payment_methods: Vec::new(),
            notifications: true,
            language: "en".to_string(),
            theme: "dark".to_string(),
            total_rides: 0,
            rating: 5.0,
        }
    }
}

impl UserProfile {
    pub fn to_fields(&self) -> Fields {
        Fields::new()
            .with("homeAddress", self.home_address.as_str())
            .with("workAddress", self.work_address.as_str())
            .with("favoriteLocations", self.favorite_locations.clone())
            .with("paymentMethods", self.payment_methods.clone())
            .with(
                "preferences",
                Fields::new()
                    .with("notifications", self.notifications)
                    .with("language", self.language.as_str())
                    .with("theme", self.theme.as_str()),
            )
            .with("totalRides", self.total_rides)
            .with("rating", self.rating)
    }
}

/// A past ride in a user's ride-history collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RideRecord {
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub origin_address: String,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub destination_address: String,
    pub time: DateTime<Utc>,
    pub user_email: String,
    pub driver_email: String,
}

impl RideRecord {
    pub fn to_fields(&self) -> Fields {
        Fields::new()
            .with("OriginLat", self.origin_lat)
            .with("OriginLng", self.origin_lng)
            .with("OriginAddress", self.origin_address.as_str())
            .with("destinationLat", self.destination_lat)
            .with("destinationLng", self.destination_lng)
            .with("destinationAddress", self.destination_address.as_str())
            .with("time", self.time)
            .with("userEmail", self.user_email.as_str())
            .with("driverEmail", self.driver_email.as_str())
    }
}
