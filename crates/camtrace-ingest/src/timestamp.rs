use chrono::NaiveDateTime;

/// Raw timestamp attribute parts as read off a `<traceitem>` element.
#[derive(Debug, Clone, Default)]
pub struct TimestampParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub date: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub millisecond: Option<u32>,
    pub nanosecond: Option<u32>,
}

impl TimestampParts {
    /// Compose into a timestamp when year/month/date/hour/minute/second are all
    /// present; millisecond/nanosecond refine
    /// sub-second precision when present, otherwise default to zero.
    pub fn compose(&self) -> Option<NaiveDateTime> {
        let date = chrono::NaiveDate::from_ymd_opt(self.year?, self.month?, self.date?)?;
        let nanos = self
            .nanosecond
            .or_else(|| self.millisecond.map(|ms| ms * 1_000_000))
            .unwrap_or(0);
        let time =
            chrono::NaiveTime::from_hms_nano_opt(self.hour?, self.minute?, self.second?, nanos)?;
        Some(NaiveDateTime::new(date, time))
    }
}
