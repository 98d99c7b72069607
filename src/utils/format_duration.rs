pub trait FormatDuration {
    fn format_largest(&self) -> String;
    fn format_full(&self) -> String;
}

impl FormatDuration for chrono::Duration {
    /// Only the largest nonzero unit, e.g. "4 minutes".
    #[rustfmt::skip]
    fn format_largest(&self) -> String {
        let (h, m, s) = (
            self.num_hours(),
            self.num_minutes(),
            self.num_seconds(),
        );

        match (h, m, s) {
            (1  , _  , _  ) => "1 hour".to_string(),
            (2.., _  , _  ) => format!("{h} hours"),
            (_  , 1  , _  ) => "1 minute".to_string(),
            (_  , 2.., _  ) => format!("{m} minutes"),
            (_  , _  , 1  ) => "1 second".to_string(),
            (_  , _  , 2..) => format!("{s} seconds"),
            (_  , _  , _  ) => "less than a second".to_string(),
        }
    }

    /// Minutes and seconds, e.g. "4m 30s".
    fn format_full(&self) -> String {
        let minutes = self.num_minutes();
        let seconds = self.num_seconds() - minutes * 60;

        match (minutes, seconds) {
            (m, _) if m < 0 => "0s".to_string(),
            (0, s) => format!("{}s", s.max(0)),
            (m, 0) => format!("{m}m"),
            (m, s) => format!("{m}m {s}s"),
        }
    }
}
