/// Logical event type carried by every scheduled newsletter delivery.
pub const NEWSLETTER_SCHEDULE_EVENT: &str = "newsletter.schedule";

/// Hour of day (in the reference time zone) at which deliveries fire.
pub const DELIVERY_HOUR: u32 = 9;

/// Default reference time zone for the delivery hour.
pub const DEFAULT_DELIVERY_TIMEZONE: chrono_tz::Tz = chrono_tz::UTC;
