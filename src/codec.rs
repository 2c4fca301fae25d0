//! Serde helpers shared by stored records and request payloads.

/// Timestamps are BSON dates in the store and RFC 3339 strings on the wire.
/// Deserialization accepts either form.
pub mod timestamp {
    use bson::Bson;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        from_bson(Bson::deserialize(deserializer)?).map_err(D::Error::custom)
    }

    pub(crate) fn from_bson(value: Bson) -> Result<DateTime<Utc>, String> {
        match value {
            Bson::DateTime(dt) => Ok(dt.to_chrono()),
            Bson::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| format!("invalid timestamp {s:?}: {e}")),
            Bson::Int64(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| format!("timestamp out of range: {ms}")),
            other => Err(format!("expected a timestamp, found {other}")),
        }
    }
}

/// Numbers that may arrive as JSON numbers or numeric strings (form inputs
/// often send `"10"`).
pub mod lenient {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Int(i64),
        Float(f64),
        Text(String),
    }

    impl Numeric {
        fn into_f64(self) -> Result<f64, String> {
            match self {
                Numeric::Int(n) => Ok(n as f64),
                Numeric::Float(f) => Ok(f),
                Numeric::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("{s:?} is not a number")),
            }
        }

        fn into_i64(self) -> Result<i64, String> {
            match self {
                Numeric::Int(n) => Ok(n),
                Numeric::Float(f) if f.fract() == 0.0 => Ok(f as i64),
                Numeric::Float(f) => Err(format!("{f} is not a whole number")),
                Numeric::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("{s:?} is not a whole number")),
            }
        }
    }

    pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Numeric::deserialize(deserializer)?
            .into_f64()
            .map_err(D::Error::custom)
    }

    pub fn i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Numeric::deserialize(deserializer)?
            .into_i64()
            .map_err(D::Error::custom)
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Option::<Numeric>::deserialize(deserializer)?
            .map(Numeric::into_f64)
            .transpose()
            .map_err(D::Error::custom)
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        Option::<Numeric>::deserialize(deserializer)?
            .map(Numeric::into_i64)
            .transpose()
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Priced {
        #[serde(deserialize_with = "lenient::f64")]
        price: f64,
        #[serde(default, deserialize_with = "lenient::opt_i64")]
        stock: Option<i64>,
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let p: Priced = serde_json::from_str(r#"{"price":"12.5","stock":"3"}"#).unwrap();
        assert_eq!(p.price, 12.5);
        assert_eq!(p.stock, Some(3));

        let p: Priced = serde_json::from_str(r#"{"price":10}"#).unwrap();
        assert_eq!(p.price, 10.0);
        assert_eq!(p.stock, None);
    }

    #[test]
    fn non_numeric_text_is_rejected() {
        assert!(serde_json::from_str::<Priced>(r#"{"price":"cheap"}"#).is_err());
        assert!(serde_json::from_str::<Priced>(r#"{"price":1,"stock":2.5}"#).is_err());
    }

    #[test]
    fn timestamps_accept_bson_dates_and_strings() {
        let now = bson::DateTime::now();
        let from_date = timestamp::from_bson(Bson::DateTime(now)).unwrap();
        assert_eq!(from_date.timestamp_millis(), now.timestamp_millis());

        let from_text =
            timestamp::from_bson(Bson::String("2024-05-01T10:00:00.000Z".into())).unwrap();
        assert_eq!(from_text.timestamp(), 1_714_557_600);

        assert!(timestamp::from_bson(Bson::Boolean(true)).is_err());
    }
}
