//! Daily trigger specification and its occurrence arithmetic.
//!
//! All scheduling decisions that depend on wall-clock time (when the next
//! send happens, whether a missed send is still inside the misfire grace
//! window) are pure functions of a [`TriggerSpec`] and an instant, so they
//! can be checked without waiting on a real clock.

use chrono::{DateTime, Days, NaiveDate, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::app_config::AppConfig;
use crate::error::TriggerError;

/// How late a missed occurrence may still be fired on (re)start.
pub const MISFIRE_GRACE_SECS: i64 = 3_600;

/// How many calendar days to probe when looking for an occurrence. A DST
/// gap removes at most one day's local time, so this always finds one.
const SEARCH_DAYS: u64 = 3;

/// `hour:minute` every day in a named timezone, plus the misfire grace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    hour: u32,
    minute: u32,
    timezone: Tz,
    misfire_grace: TimeDelta,
}

impl TriggerSpec {
    /// Validates the fields and resolves the IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError`] when the hour or minute is out of range or
    /// the timezone name is unknown.
    pub fn new(hour: u32, minute: u32, timezone: &str) -> Result<Self, TriggerError> {
        if hour > 23 {
            return Err(TriggerError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TriggerError::MinuteOutOfRange(minute));
        }
        let timezone = timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| TriggerError::UnknownTimezone(timezone.to_string()))?;

        Ok(Self {
            hour,
            minute,
            timezone,
            misfire_grace: TimeDelta::seconds(MISFIRE_GRACE_SECS),
        })
    }

    /// Builds the daily send trigger from configuration.
    ///
    /// # Errors
    ///
    /// See [`TriggerSpec::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, TriggerError> {
        Self::new(
            config.meal_send_hour,
            config.meal_send_minute,
            &config.timezone,
        )
    }

    #[must_use]
    pub fn hour(&self) -> u32 {
        self.hour
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.minute
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    #[must_use]
    pub fn misfire_grace(&self) -> TimeDelta {
        self.misfire_grace
    }

    /// Six-field cron expression (`sec min hour dom mon dow`) for this trigger.
    #[must_use]
    pub fn cron_expression(&self) -> String {
        format!("0 {} {} * * *", self.minute, self.hour)
    }

    /// The first occurrence strictly after `instant`.
    #[must_use]
    pub fn next_after(&self, instant: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let start = self.local_date(instant);
        (0..=SEARCH_DAYS)
            .filter_map(|offset| start.checked_add_days(Days::new(offset)))
            .filter_map(|date| self.occurrence_on(date))
            .find(|occurrence| occurrence.with_timezone(&Utc) > instant)
    }

    /// The most recent occurrence at or before `instant`.
    #[must_use]
    pub fn latest_at_or_before(&self, instant: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let start = self.local_date(instant);
        (0..=SEARCH_DAYS)
            .filter_map(|offset| start.checked_sub_days(Days::new(offset)))
            .filter_map(|date| self.occurrence_on(date))
            .find(|occurrence| occurrence.with_timezone(&Utc) <= instant)
    }

    /// The occurrence a process starting at `now` has missed but may still
    /// fire: strictly before `now` and no more than the grace window ago.
    #[must_use]
    pub fn missed_occurrence(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let latest = self.latest_at_or_before(now)?;
        let lateness = now.signed_duration_since(latest.with_timezone(&Utc));
        (lateness > TimeDelta::zero() && lateness <= self.misfire_grace).then_some(latest)
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }

    /// Non-existent local times (DST gap) yield `None`; ambiguous ones
    /// resolve to the earlier instant.
    fn occurrence_on(&self, date: NaiveDate) -> Option<DateTime<Tz>> {
        let naive = date.and_hms_opt(self.hour, self.minute, 0)?;
        self.timezone.from_local_datetime(&naive).earliest()
    }
}
